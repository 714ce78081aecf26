//! Poll cycle
//!
//! Updates every observable value and reports the results either as log
//! lines or as one JSON object per cycle.

use crate::entities::ObservableValue;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Update all values once
pub async fn poll_once(values: &mut [ObservableValue]) {
    for value in values.iter_mut() {
        value.update().await;
    }
}

/// Current values keyed by name; unknown values are `null`
pub fn to_json(values: &[ObservableValue]) -> Map<String, Value> {
    values
        .iter()
        .map(|v| (v.name(), v.value().map(Value::from).unwrap_or(Value::Null)))
        .collect()
}

/// Emit one cycle's values
pub fn report(values: &[ObservableValue], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&to_json(values))?);
    } else {
        for value in values {
            info!("{}", value.display());
        }
    }
    Ok(())
}

/// Poll forever at `period`; callers stop it by dropping the future
pub async fn run(values: &mut [ObservableValue], period: Duration, json: bool) -> anyhow::Result<()> {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        debug!("Poll cycle");
        poll_once(values).await;
        report(values, json)?;
    }
}
