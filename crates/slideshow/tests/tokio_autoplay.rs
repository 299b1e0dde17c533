use std::time::Duration;

use shared::domain::SlideId;
use slideshow::{
    CarouselConfig, CarouselInput, RecordingPresentation, SlideshowController, TimerHandle,
    TokioScheduler, Transition,
};
use tokio::{sync::mpsc, time};

fn slides(count: usize) -> Vec<SlideId> {
    (0..count).map(|i| SlideId::new(format!("slide-{i}"))).collect()
}

async fn next_tick(rx: &mut mpsc::UnboundedReceiver<TimerHandle>, within: Duration) -> Option<TimerHandle> {
    time::timeout(within, rx.recv()).await.ok().flatten()
}

#[tokio::test(start_paused = true)]
async fn autoplay_ticks_drive_transitions_through_the_host_queue() {
    let (scheduler, mut fired) = TokioScheduler::new();
    let mut controller = SlideshowController::new(
        slides(3),
        3,
        scheduler,
        RecordingPresentation::new(3, 3),
        CarouselConfig::default(),
    )
    .expect("controller");

    let mut seen = Vec::new();
    for _ in 0..3 {
        let handle = next_tick(&mut fired, Duration::from_secs(6))
            .await
            .expect("tick");
        seen.extend(controller.handle(CarouselInput::Timer(handle)));
    }

    assert_eq!(
        seen,
        vec![
            Transition { from: 0, to: 1 },
            Transition { from: 1, to: 2 },
            Transition { from: 2, to: 0 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn hover_suspends_autoplay_until_pointer_leaves() {
    let (scheduler, mut fired) = TokioScheduler::new();
    let mut controller = SlideshowController::new(
        slides(3),
        3,
        scheduler,
        RecordingPresentation::new(3, 3),
        CarouselConfig::default(),
    )
    .expect("controller");

    controller.handle(CarouselInput::PointerEnter);
    assert_eq!(next_tick(&mut fired, Duration::from_secs(30)).await, None);
    assert_eq!(controller.active_index(), 0);

    controller.handle(CarouselInput::PointerLeave);
    let resumed_at = time::Instant::now();
    let handle = next_tick(&mut fired, Duration::from_secs(6))
        .await
        .expect("tick after leave");
    assert!(resumed_at.elapsed() >= Duration::from_secs(5));
    assert_eq!(
        controller.handle(CarouselInput::Timer(handle)),
        Some(Transition { from: 0, to: 1 })
    );
}
