use std::time::{Duration, Instant};

/// Wall-clock timer for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops the timer and logs `label: <ms> ms` at info level.
    pub fn stop_and_report(self, label: &str) -> Duration {
        let elapsed = self.elapsed();
        tracing::info!("{}: {:.3} ms", label, elapsed.as_secs_f64() * 1000.0);
        elapsed
    }
}

/// A value together with the time it took to produce.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    /// Runs `f`, timing it under `label`.
    pub fn measure<E>(label: &str, f: impl FnOnce() -> Result<T, E>) -> Result<Timed<T>, E> {
        let stopwatch = Stopwatch::start();
        let value = f()?;
        let elapsed = stopwatch.stop_and_report(label);

        Ok(Timed { value, elapsed })
    }

    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_returns_value_and_duration() {
        let timed = Timed::measure("sleep", || {
            std::thread::sleep(Duration::from_millis(5));
            Ok::<_, ()>(42)
        })
        .unwrap();

        assert_eq!(timed.value, 42);
        assert!(timed.elapsed >= Duration::from_millis(5));
        assert!(timed.millis() >= 5.0);
    }

    #[test]
    fn measure_propagates_errors() {
        let result: Result<Timed<u8>, &str> = Timed::measure("failing", || Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
    }
}
