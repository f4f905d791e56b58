use super::types::{AverageRecord, HistoricalSample};

/// Per-metric sample lists collected across the historical window.
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    temperature: Vec<f64>,
    pressure: Vec<f64>,
    humidity: Vec<f64>,
    wind_speed: Vec<f64>,
}

impl SampleAccumulator {
    /// Add whichever metrics the sample carries.
    pub fn push(&mut self, sample: &HistoricalSample) {
        if let Some(temp) = sample.temp {
            self.temperature.push(temp);
        }
        if let Some(pressure) = sample.pressure {
            self.pressure.push(pressure);
        }
        if let Some(humidity) = sample.humidity {
            self.humidity.push(humidity);
        }
        if let Some(wind_speed) = sample.wind_speed {
            self.wind_speed.push(wind_speed);
        }
    }

    pub fn average(&self) -> AverageRecord {
        AverageRecord {
            temperature_c: mean_or_warn(&self.temperature, "temperature"),
            pressure_hpa: mean_or_warn(&self.pressure, "pressure"),
            humidity_pct: mean_or_warn(&self.humidity, "humidity"),
            wind_speed_ms: mean_or_warn(&self.wind_speed, "wind speed"),
        }
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn mean_or_warn(values: &[f64], metric: &str) -> Option<f64> {
    let avg = mean(values);
    if avg.is_none() {
        tracing::warn!("No {} data found for the past 7 days", metric);
    }
    avg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temp: Option<f64>, humidity: Option<f64>) -> HistoricalSample {
        HistoricalSample {
            dt: None,
            temp,
            pressure: Some(1015.0),
            humidity,
            wind_speed: Some(2.0),
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10.0, 20.0, 30.0]), Some(20.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_average_over_samples() {
        let mut acc = SampleAccumulator::default();
        acc.push(&sample(Some(10.0), Some(50.0)));
        acc.push(&sample(Some(20.0), Some(60.0)));
        acc.push(&sample(Some(30.0), Some(70.0)));

        let avg = acc.average();
        assert_eq!(avg.temperature_c, Some(20.0));
        assert_eq!(avg.humidity_pct, Some(60.0));
        assert_eq!(avg.pressure_hpa, Some(1015.0));
        assert_eq!(avg.wind_speed_ms, Some(2.0));
    }

    #[test]
    fn test_missing_fields_are_skipped_not_zeroed() {
        let mut acc = SampleAccumulator::default();
        acc.push(&sample(Some(10.0), Some(40.0)));
        acc.push(&sample(Some(20.0), None));
        acc.push(&sample(Some(30.0), Some(80.0)));

        assert_eq!(acc.average().humidity_pct, Some(60.0));
    }

    #[test]
    fn test_metric_without_samples_is_omitted() {
        let mut acc = SampleAccumulator::default();
        acc.push(&sample(Some(10.0), None));

        let avg = acc.average();
        assert_eq!(avg.humidity_pct, None);

        let json = serde_json::to_value(&avg).unwrap();
        assert!(json.get("Humidity_Average(Percentage)").is_none());
        assert_eq!(json["Temperature_Average(Celsius)"], 10.0);
    }
}
