//! Quick benchmark to check workflow rendering cost as task lists grow

use failover_gen::{FailoverConfig, Task, WorkflowTemplate};
use std::time::Instant;

fn config(n: usize) -> FailoverConfig {
    let tasks = (0..n)
        .map(|i| {
            let kind = if i % 2 == 0 { "invoke-lambda" } else { "invoke-step-function" };
            Task::new(
                format!("task-{i}"),
                kind,
                format!("arn:aws:lambda:eu-west-1:123456789012:function:f{i}"),
                format!(r#"{{"index": {i}, "region": "eu-west-1"}}"#),
            )
            .with_description(format!("Failover step {i}"))
        })
        .collect();
    FailoverConfig { tasks }
}

fn main() {
    let template = WorkflowTemplate::new().expect("template compiles");

    println!("Workflow Render Performance Test");
    println!("================================\n");

    for size in [1, 10, 100, 1_000] {
        let config = config(size);
        let iterations: u32 = if size >= 1_000 { 100 } else { 1_000 };

        // Warm up
        let _ = template.render(&config);

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = template.render(&config);
        }
        let elapsed = start.elapsed();

        println!("Tasks: {size}");
        println!("  Time for {} iterations: {:?}", iterations, elapsed);
        println!("  Per render: {:?}\n", elapsed / iterations);
    }
}
