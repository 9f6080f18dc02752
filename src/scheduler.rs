use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Days, Local, NaiveDateTime, NaiveTime, Weekday};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ScheduleConfig, parse_time};
use crate::theme::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    pub fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Weekday,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub day: DayType,
    pub time: NaiveTime,
    pub bucket: Bucket,
}

/// Day-type and time-of-day table of generation slots.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let mut entries = Vec::new();

        for text in &config.weekday {
            let time = parse_time(text)?;
            entries.push(ScheduleEntry {
                day: DayType::Weekday,
                time,
                bucket: Bucket::for_time(time),
            });
        }

        for day in [DayType::Saturday, DayType::Sunday] {
            for text in &config.weekend {
                let time = parse_time(text)?;
                entries.push(ScheduleEntry {
                    day,
                    time,
                    bucket: Bucket::for_time(time),
                });
            }
        }

        entries.sort_by_key(|e| e.time);
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn entries_for(&self, day: DayType) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(move |e| e.day == day)
    }

    /// Every slot occurring in `(after, upto]`, in chronological order.
    pub fn due_between(&self, after: NaiveDateTime, upto: NaiveDateTime) -> Vec<(NaiveDateTime, &ScheduleEntry)> {
        let mut due = Vec::new();
        if upto <= after {
            return due;
        }

        let mut date = after.date();
        while date <= upto.date() {
            for entry in self.entries_for(DayType::of(date.weekday())) {
                let at = date.and_time(entry.time);
                if at > after && at <= upto {
                    due.push((at, entry));
                }
            }
            match date.checked_add_days(Days::new(1)) {
                Some(next) => date = next,
                None => break,
            }
        }

        due
    }
}

/// Shared stop flag; clones observe the same state. Stopping also wakes a
/// sleeping poll loop.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }
}

impl SchedulerState {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// One listener for the whole run, so an interrupt during a slot is not lost.
fn watch_interrupt(state: SchedulerState) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping scheduler");
                state.stop();
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    })
}

#[async_trait]
pub trait SlotHandler: Send {
    /// Produces the post for one slot; returns whether it succeeded.
    async fn fire(&mut self, bucket: Bucket) -> bool;
}

pub struct Scheduler {
    schedule: Schedule,
    poll_interval: Duration,
    state: SchedulerState,
    last_check: NaiveDateTime,
}

impl Scheduler {
    /// `started_at` is the first `last_check`: slots before it never fire.
    pub fn new(schedule: Schedule, poll_interval: Duration, started_at: NaiveDateTime, state: SchedulerState) -> Self {
        Self {
            schedule,
            poll_interval,
            state,
            last_check: started_at,
        }
    }

    /// Fires every slot due since the previous check, stopping early once the
    /// state is stopped. Returns how many fired.
    pub async fn tick<H: SlotHandler + ?Sized>(&mut self, now: NaiveDateTime, handler: &mut H) -> usize {
        let due: Vec<(NaiveDateTime, Bucket)> = self
            .schedule
            .due_between(self.last_check, now)
            .into_iter()
            .map(|(at, entry)| (at, entry.bucket))
            .collect();
        self.last_check = now;

        let mut fired = 0;
        for (at, bucket) in &due {
            if !self.state.is_running() {
                info!(skipped = due.len() - fired, "Stop requested, skipping remaining slots");
                break;
            }

            info!(slot = %at, bucket = %bucket, "Scheduled slot due");
            if !handler.fire(*bucket).await {
                warn!(slot = %at, bucket = %bucket, "Scheduled post failed");
            }
            fired += 1;
        }

        fired
    }

    /// Polls the wall clock until the state is stopped or Ctrl-C arrives.
    pub async fn run<H: SlotHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        info!(
            slots = self.schedule.entries().len(),
            poll_secs = self.poll_interval.as_secs(),
            "Scheduler started"
        );

        let watcher = watch_interrupt(self.state.clone());

        while self.state.is_running() {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.state.wake.notified() => {}
            }

            if !self.state.is_running() {
                break;
            }

            let fired = self.tick(Local::now().naive_local(), handler).await;
            debug!(fired, "Scheduler wake");
        }

        watcher.abort();
        info!("Scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder {
        fired: Vec<Bucket>,
    }

    #[async_trait]
    impl SlotHandler for Recorder {
        async fn fire(&mut self, bucket: Bucket) -> bool {
            self.fired.push(bucket);
            true
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn schedule() -> Schedule {
        Schedule::from_config(&ScheduleConfig::default()).unwrap()
    }

    async fn sweep_day(date: NaiveDate) -> (Vec<NaiveDateTime>, Vec<Bucket>) {
        let start = date.and_hms_opt(0, 0, 0).unwrap();
        let mut scheduler = Scheduler::new(schedule(), Duration::from_secs(60), start, SchedulerState::default());
        let mut recorder = Recorder::default();
        let mut fired_at = Vec::new();

        for minute in 1..(24 * 60) {
            let now = start + chrono::Duration::minutes(minute);
            if scheduler.tick(now, &mut recorder).await > 0 {
                fired_at.push(now);
            }
        }

        (fired_at, recorder.fired)
    }

    #[tokio::test]
    async fn saturday_sweep_fires_four_slots() {
        // 2024-06-01 is a Saturday
        let (fired_at, buckets) = sweep_day(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).await;

        assert_eq!(
            fired_at,
            vec![
                at(2024, 6, 1, 9, 0),
                at(2024, 6, 1, 12, 0),
                at(2024, 6, 1, 15, 0),
                at(2024, 6, 1, 19, 0)
            ]
        );
        assert_eq!(
            buckets,
            vec![Bucket::Morning, Bucket::Afternoon, Bucket::Afternoon, Bucket::Evening]
        );
    }

    #[tokio::test]
    async fn weekday_sweep_fires_morning_and_evening() {
        // 2024-06-04 is a Tuesday
        let (fired_at, buckets) = sweep_day(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()).await;

        assert_eq!(fired_at, vec![at(2024, 6, 4, 9, 0), at(2024, 6, 4, 17, 0)]);
        assert_eq!(buckets, vec![Bucket::Morning, Bucket::Evening]);
    }

    #[tokio::test]
    async fn slots_before_start_are_not_caught_up() {
        let mut scheduler = Scheduler::new(
            schedule(),
            Duration::from_secs(60),
            at(2024, 6, 1, 10, 30),
            SchedulerState::default(),
        );
        let mut recorder = Recorder::default();

        assert_eq!(scheduler.tick(at(2024, 6, 1, 10, 31), &mut recorder).await, 0);
        assert!(recorder.fired.is_empty());
    }

    #[test]
    fn due_between_spans_midnight() {
        let schedule = schedule();
        let due = schedule.due_between(at(2024, 6, 7, 16, 0), at(2024, 6, 8, 10, 0));
        let times: Vec<_> = due.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![at(2024, 6, 7, 17, 0), at(2024, 6, 8, 9, 0)]);
    }

    #[test]
    fn weekday_table_is_shared_by_all_weekdays() {
        let schedule = schedule();
        assert_eq!(schedule.entries_for(DayType::Weekday).count(), 2);
        assert_eq!(schedule.entries_for(DayType::Saturday).count(), 4);
        assert_eq!(schedule.entries_for(DayType::Sunday).count(), 4);
        assert_eq!(DayType::of(Weekday::Wed), DayType::Weekday);
    }

    // Interrupts reach every listener in the process, so runs take turns.
    static RUN_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

    #[tokio::test]
    async fn stopped_scheduler_returns_without_firing() {
        let _turn = RUN_LOCK.lock().await;
        let state = SchedulerState::default();
        let mut scheduler = Scheduler::new(schedule(), Duration::from_secs(3600), at(2024, 6, 1, 8, 0), state.clone());
        state.stop();
        let mut recorder = Recorder::default();

        scheduler.run(&mut recorder).await.unwrap();
        assert!(recorder.fired.is_empty());
    }

    // Stops the scheduler from inside the first slot it fires.
    struct StopOnFire {
        state: SchedulerState,
        fired: usize,
        interrupt: bool,
    }

    #[async_trait]
    impl SlotHandler for StopOnFire {
        async fn fire(&mut self, _bucket: Bucket) -> bool {
            self.fired += 1;
            if self.interrupt {
                #[cfg(unix)]
                std::process::Command::new("kill")
                    .args(["-INT", &std::process::id().to_string()])
                    .status()
                    .unwrap();
            } else {
                self.state.stop();
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
            true
        }
    }

    fn two_days_back() -> NaiveDateTime {
        Local::now().naive_local() - chrono::Duration::days(2)
    }

    #[tokio::test]
    async fn stop_during_slot_skips_the_rest_of_the_backlog() {
        let _turn = RUN_LOCK.lock().await;
        let state = SchedulerState::default();
        let mut scheduler = Scheduler::new(schedule(), Duration::from_millis(10), two_days_back(), state.clone());
        let mut handler = StopOnFire {
            state,
            fired: 0,
            interrupt: false,
        };

        tokio::time::timeout(Duration::from_secs(5), scheduler.run(&mut handler))
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert_eq!(handler.fired, 1);
    }

    #[tokio::test]
    async fn stop_wakes_a_sleeping_scheduler() {
        let _turn = RUN_LOCK.lock().await;
        let state = SchedulerState::default();
        let mut scheduler = Scheduler::new(schedule(), Duration::from_secs(3600), Local::now().naive_local(), state.clone());
        let mut recorder = Recorder::default();

        let stopper = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.stop();
        });

        tokio::time::timeout(Duration::from_secs(5), scheduler.run(&mut recorder))
            .await
            .expect("scheduler kept sleeping")
            .unwrap();
        assert!(recorder.fired.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn ctrl_c_during_slot_stops_scheduler() {
        use tokio::signal::unix::{SignalKind, signal};

        let _turn = RUN_LOCK.lock().await;
        // Keeps SIGINT from terminating the test binary.
        let _sigint = signal(SignalKind::interrupt()).unwrap();

        let state = SchedulerState::default();
        let mut scheduler = Scheduler::new(schedule(), Duration::from_millis(10), two_days_back(), state.clone());
        let mut handler = StopOnFire {
            state: state.clone(),
            fired: 0,
            interrupt: true,
        };

        tokio::time::timeout(Duration::from_secs(10), scheduler.run(&mut handler))
            .await
            .expect("interrupt during a slot was lost")
            .unwrap();
        assert_eq!(handler.fired, 1);
        assert!(!state.is_running());
    }
}
