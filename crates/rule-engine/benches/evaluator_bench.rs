//! 条件评估器性能基准测试
//!
//! 覆盖单条件比较、字符串转换路径以及嵌套表达式树的求值开销。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::entity::{EntityRecord, Ticket, TicketStatus};
use rule_engine::evaluator::ConditionEvaluator;
use rule_engine::value::SymbolicEnum;
use rule_engine::{EntityData, Expression, ExpressionCodec, FieldValue, Operator};
use serde_json::json;
use std::hint::black_box;

fn sample_ticket() -> EntityData {
    Ticket::new(1, "VPN outage", TicketStatus::Open)
        .with_priority(1)
        .with_assignee("alice")
        .to_field_map()
}

/// 数值比较基准
fn bench_numeric_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("numeric_operations");

    let field = FieldValue::Int(1000);
    let literal = json!(500);
    let text_literal = json!("500");

    for operator in [
        Operator::Equals,
        Operator::NotEquals,
        Operator::GreaterThan,
        Operator::LessThanOrEquals,
    ] {
        group.bench_with_input(
            BenchmarkId::new("native", operator),
            &operator,
            |b, operator| {
                b.iter(|| {
                    ConditionEvaluator::evaluate(
                        black_box("priority"),
                        black_box(Some(&field)),
                        black_box(*operator),
                        black_box(&literal),
                    )
                })
            },
        );
    }

    // 比较值为字符串时需要先转换为字段类型
    group.bench_function("coerced_gt", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box("priority"),
                black_box(Some(&field)),
                black_box(Operator::GreaterThan),
                black_box(&text_literal),
            )
        })
    });

    group.finish();
}

/// 字符串与枚举操作基准
fn bench_string_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_operations");

    let field = FieldValue::from("hello world");
    let status = FieldValue::from(TicketStatus::InProgress.symbol());

    group.bench_function("contains", |b| {
        let literal = json!("world");
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box("title"),
                black_box(Some(&field)),
                black_box(Operator::Contains),
                black_box(&literal),
            )
        })
    });

    group.bench_function("starts_with", |b| {
        let literal = json!("hello");
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box("title"),
                black_box(Some(&field)),
                black_box(Operator::StartsWith),
                black_box(&literal),
            )
        })
    });

    group.bench_function("enum_equals", |b| {
        let literal = json!("IN_PROGRESS");
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box("status"),
                black_box(Some(&status)),
                black_box(Operator::Equals),
                black_box(&literal),
            )
        })
    });

    group.finish();
}

/// 字段缺失与空值检查基准
fn bench_null_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("null_checks");

    let literal = json!(null);

    group.bench_function("is_null_missing", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box("assignee"),
                black_box(None),
                black_box(Operator::IsNull),
                black_box(&literal),
            )
        })
    });

    let value = json!(1);
    group.bench_function("equals_missing", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box("priority"),
                black_box(None),
                black_box(Operator::Equals),
                black_box(&value),
            )
        })
    });

    group.finish();
}

/// 表达式树求值基准，按条件数量扩展
fn bench_expression_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_scaling");
    let data = sample_ticket();

    for size in [1usize, 10, 50, 100].iter() {
        let expression = Expression::and(
            (0..*size)
                .map(|i| Expression::condition("priority", Operator::LessThan, 1000 + i as i64))
                .collect(),
        );

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(&expression).evaluate(black_box(&data)))
        });
    }

    group.finish();
}

/// 解码并求值基准
fn bench_decode_and_evaluate(c: &mut Criterion) {
    let data = sample_ticket();
    let json = r#"{
        "type": "AND",
        "expressions": [
            {"type": "CONDITION", "field": "status", "operator": "EQUALS", "value": "OPEN"},
            {"type": "OR", "expressions": [
                {"type": "CONDITION", "field": "priority", "operator": "EQUALS", "value": 1},
                {"type": "CONDITION", "field": "assignee", "operator": "IS_NULL"}
            ]}
        ]
    }"#;

    c.bench_function("decode_and_evaluate", |b| {
        b.iter(|| {
            ExpressionCodec::decode(black_box(json))
                .map(|expression| expression.evaluate(black_box(&data)))
        })
    });
}

criterion_group!(
    benches,
    bench_numeric_operations,
    bench_string_operations,
    bench_null_checks,
    bench_expression_scaling,
    bench_decode_and_evaluate,
);

criterion_main!(benches);
