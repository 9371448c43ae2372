//! End-to-end session flow: reducer effects carried out against a real runner
//! and the simulated progress source.

use std::sync::Arc;

use fis_core::config::SimulationSettings;
use fis_core::models::{ImageFile, JobKind, Tier};
use fis_core::progress::SimulatedProgress;
use fis_core::runner::{JobResult, JobRunner, RunnerError};
use fis_core::session::{
    update, ConfiguredTier, Effect, JobPhase, SessionMsg, SessionState, TierResolver,
};

fn runner() -> JobRunner {
    JobRunner::new(Arc::new(SimulatedProgress::new(SimulationSettings {
        tick_interval_ms: 50,
        frames_per_tick: 6.0,
        sketch_percent_per_tick: 12.5,
        finish_delay_ms: 100,
        ..SimulationSettings::default()
    })))
}

fn apply(state: SessionState, msgs: Vec<SessionMsg>) -> (SessionState, Vec<Effect>) {
    msgs.into_iter().fold((state, Vec::new()), |(state, mut all), msg| {
        let (next, effects) = update(&state, msg);
        all.extend(effects);
        (next, all)
    })
}

fn take_job(effects: Vec<Effect>) -> fis_core::models::AcceptedJob {
    effects
        .into_iter()
        .find_map(|e| match e {
            Effect::StartJob(job) => Some(job),
            _ => None,
        })
        .expect("a job should have been started")
}

#[tokio::test(start_paused = true)]
async fn interpolation_runs_to_completion() {
    let resolver = ConfiguredTier::new(Tier::Premium);
    let files: Vec<ImageFile> = (0..4)
        .map(|i| ImageFile::new(format!("frame_{i}.png"), "image/png", 2048))
        .collect();

    let (mut state, effects) = apply(
        SessionState::default(),
        vec![
            SessionMsg::TierResolved(resolver.resolve_tier()),
            SessionMsg::FilesSelected(files),
            SessionMsg::FramesPerImageChanged(30),
            SessionMsg::Submit,
        ],
    );
    let job = take_job(effects);
    assert_eq!(job.total_frames(), 120);
    let job_id = job.id().to_string();

    let runner = runner();
    let running = runner.start(job, &state.tier().limits()).unwrap();

    let mut updates = Vec::new();
    let result = running.run(|p| updates.push(p.clone())).await;

    let mut displayed = Vec::new();
    for progress in updates {
        let (next, _) = update(
            &state,
            SessionMsg::JobProgressed {
                job_id: job_id.clone(),
                progress,
            },
        );
        displayed.push(next.progress());
        state = next;
    }
    assert!(displayed.windows(2).all(|w| w[1] >= w[0]));
    assert!(displayed[0] > 0.0);

    let (state, effects) = update(&state, SessionMsg::JobFinished { job_id, result });
    assert!(matches!(state.phase(), JobPhase::Finished { artifact_url: Some(_) }));
    assert_eq!(state.progress(), 100.0);
    assert_eq!(effects.len(), 1);
    assert!(!runner.is_busy());
}

#[tokio::test(start_paused = true)]
async fn second_job_refused_until_first_finishes() {
    let runner = runner();
    let limits = Tier::Free.limits();

    let (state, effects) = apply(
        SessionState::default(),
        vec![
            SessionMsg::SwitchView(JobKind::SketchToImage),
            SessionMsg::SketchSelected(ImageFile::new("sketch.webp", "image/webp", 512)),
            SessionMsg::PromptChanged("harbour at night".to_string()),
            SessionMsg::Submit,
        ],
    );
    let first = take_job(effects);
    let running = runner.start(first, &limits).unwrap();

    // Reset is refused while the sketch job runs.
    let (after, _) = apply(state.clone(), vec![SessionMsg::Reset]);
    assert_eq!(after, state);

    // A second session sharing the runner is turned away.
    let (other, effects) = apply(
        SessionState::default(),
        vec![
            SessionMsg::FilesSelected(vec![ImageFile::new("a.jpg", "image/jpeg", 10)]),
            SessionMsg::Submit,
        ],
    );
    assert!(other.is_running());
    let second = take_job(effects);
    assert!(matches!(
        runner.start(second, &limits),
        Err(RunnerError::Busy { .. })
    ));

    let result = running.run(|_| {}).await;
    assert!(result.is_success());
    assert!(!runner.is_busy());
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_running_job() {
    let runner = runner();
    let (state, effects) = apply(
        SessionState::default(),
        vec![
            SessionMsg::FilesSelected(vec![ImageFile::new("a.png", "image/png", 10); 200]),
            SessionMsg::Submit,
        ],
    );
    let job = take_job(effects);
    let job_id = job.id().to_string();
    let running = runner.start(job, &Tier::Free.limits()).unwrap();
    let handle = running.cancel_handle();

    let (_, effects) = update(&state, SessionMsg::Teardown);
    assert_eq!(effects, vec![Effect::CancelJob { job_id }]);
    handle.cancel();

    assert_eq!(running.run(|_| {}).await, JobResult::Cancelled);
    assert!(!runner.is_busy());
}
