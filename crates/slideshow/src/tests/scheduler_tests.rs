use super::*;

#[test]
fn virtual_repeating_timer_fires_once_per_period() {
    let scheduler = VirtualScheduler::new();
    let handle = scheduler.schedule_repeating(Duration::from_millis(5000));

    assert!(scheduler.advance(Duration::from_millis(4999)).is_empty());
    assert_eq!(scheduler.advance(Duration::from_millis(1)), vec![handle]);
    assert_eq!(
        scheduler.advance(Duration::from_millis(10_000)),
        vec![handle, handle]
    );
    assert!(scheduler.is_pending(handle));
}

#[test]
fn virtual_one_shot_timer_fires_once_and_is_released() {
    let scheduler = VirtualScheduler::new();
    let handle = scheduler.schedule_once(Duration::from_millis(250));

    assert_eq!(scheduler.advance(Duration::from_secs(2)), vec![handle]);
    assert_eq!(scheduler.pending(), 0);
    assert!(scheduler.advance(Duration::from_secs(2)).is_empty());
}

#[test]
fn virtual_cancel_prevents_firing() {
    let scheduler = VirtualScheduler::new();
    let handle = scheduler.schedule_repeating(Duration::from_secs(5));
    scheduler.cancel(handle);
    scheduler.cancel(handle);

    assert!(scheduler.advance(Duration::from_secs(60)).is_empty());
}

#[test]
fn virtual_firings_are_ordered_by_due_time_then_handle() {
    let scheduler = VirtualScheduler::new();
    let slow = scheduler.schedule_once(Duration::from_millis(300));
    let fast = scheduler.schedule_once(Duration::from_millis(100));
    let tie = scheduler.schedule_once(Duration::from_millis(300));

    assert_eq!(
        scheduler.advance(Duration::from_secs(1)),
        vec![fast, slow, tie]
    );
    assert_eq!(scheduler.now(), Duration::from_secs(1));
}

#[test]
fn clones_share_the_same_clock() {
    let scheduler = VirtualScheduler::new();
    let observer = scheduler.clone();
    let handle = scheduler.schedule_once(Duration::from_millis(10));

    assert_eq!(observer.advance(Duration::from_millis(10)), vec![handle]);
    assert_eq!(scheduler.now(), Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn tokio_repeating_timer_delivers_after_each_period() {
    let (scheduler, mut fired) = TokioScheduler::new();
    let start = Instant::now();
    let handle = scheduler.schedule_repeating(Duration::from_secs(5));

    assert_eq!(fired.recv().await, Some(handle));
    let first = start.elapsed();
    assert!(first >= Duration::from_secs(5) && first < Duration::from_millis(5001));

    assert_eq!(fired.recv().await, Some(handle));
    assert!(start.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn tokio_cancelled_timer_never_delivers() {
    let (scheduler, mut fired) = TokioScheduler::new();
    let handle = scheduler.schedule_repeating(Duration::from_secs(5));
    scheduler.cancel(handle);

    let outcome = time::timeout(Duration::from_secs(60), fired.recv()).await;
    assert!(outcome.is_err(), "cancelled timer fired: {outcome:?}");
    assert_eq!(scheduler.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_wraps_firings_into_host_events() {
    #[derive(Debug, PartialEq)]
    enum HostEvent {
        Timer(TimerHandle),
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = TokioScheduler::with_sink(tx, HostEvent::Timer);
    let handle = scheduler.schedule_once(Duration::from_millis(250));

    assert_eq!(rx.recv().await, Some(HostEvent::Timer(handle)));
}

#[test]
fn virtual_zero_period_repeats_at_minimum_period() {
    let scheduler = VirtualScheduler::new();
    let handle = scheduler.schedule_repeating(Duration::ZERO);

    assert_eq!(
        scheduler.advance(MIN_PERIOD * 3),
        vec![handle, handle, handle]
    );
    assert!(scheduler.is_pending(handle));
}

#[tokio::test(start_paused = true)]
async fn tokio_zero_period_repeats_at_minimum_period() {
    let (scheduler, mut fired) = TokioScheduler::new();
    let start = Instant::now();
    let handle = scheduler.schedule_repeating(Duration::ZERO);

    assert_eq!(fired.recv().await, Some(handle));
    assert_eq!(fired.recv().await, Some(handle));
    assert!(start.elapsed() >= MIN_PERIOD * 2);
    assert_eq!(scheduler.pending(), 1);
}
