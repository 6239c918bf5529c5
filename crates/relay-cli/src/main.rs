use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_core::{DriverSpec, HookPoint, Task, WorkReport};

#[derive(Debug, Deserialize)]
struct NotifyPayload {
    to: String,
    text: String,
}

fn deliver(provider: &str, data: Option<&Value>) -> WorkReport {
    let Some(payload) = data else {
        return WorkReport::failure(json!("no payload"));
    };
    match serde_json::from_value::<NotifyPayload>(payload.clone()) {
        Ok(p) => {
            println!("  {provider} delivering '{}' to {}", p.text, p.to);
            WorkReport::success(json!({ "delivered": true, "provider": provider }))
        }
        Err(e) => WorkReport::failure(json!(format!("json decode: {e}"))),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A messaging-style task: a flaky primary and two backup providers.
    // `alpha` fails its first attempt, then recovers.
    let flaky = Arc::new(AtomicU32::new(1));

    let mut task = Task::create(
        "notify",
        Some(json!({ "to": "+100000001", "text": "hello, relay" })),
        |t| {
            t.hook(HookPoint::Ready, |task, _| {
                info!(task = task.name(), drivers = task.driver_names().len(), "task ready");
                Ok(None)
            });
            t.hook(HookPoint::AfterRunDriver, |task, _| {
                if let Some(driver) = task.current_driver()
                    && let Some(record) = task.results().last()
                {
                    println!("  attempt via '{}': success={}", driver.name(), record.success);
                }
                Ok(None)
            });

            let remaining = Arc::clone(&flaky);
            t.register_driver(
                DriverSpec::named("alpha").weight(8),
                move |data: Option<&Value>| {
                    let left = remaining.load(Ordering::Relaxed);
                    if left > 0 {
                        remaining.fetch_sub(1, Ordering::Relaxed);
                        return WorkReport::failure(json!(format!(
                            "intentional failure (left={left})"
                        )));
                    }
                    deliver("alpha", data)
                },
            )?;

            t.register_driver(DriverSpec::parse("bravo 3 backup")?, |_: Option<&Value>| {
                WorkReport::failure(json!("bravo: provider rejected the message"))
            })?;

            t.register_driver(DriverSpec::parse("charlie 1 backup")?, |data: Option<&Value>| {
                deliver("charlie", data)
            })?;

            Ok(())
        },
    )?;

    // First run names the flaky primary explicitly so the cascade shows:
    // alpha fails, bravo (backup) fails, charlie (backup) delivers.
    println!("== run 1: explicit 'alpha' ==");
    let outcome = task.run(Some("alpha"))?;
    println!("final success: {}", outcome.succeeded());

    // Second run lets the weighted draw decide; alpha has recovered.
    println!("== run 2: weighted selection ==");
    let outcome = task.run(None)?;
    println!("final success: {}", outcome.succeeded());

    let counts = task.results().counts();
    println!(
        "attempt log: {} attempts total ({} succeeded, {} failed)",
        counts.total, counts.succeeded, counts.failed
    );
    println!("{}", serde_json::to_string_pretty(task.results())?);

    Ok(())
}
