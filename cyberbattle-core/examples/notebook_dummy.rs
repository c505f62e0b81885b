//! Training, checkpoint loading and trace of a learner on [`DummyEnv`].
//!
//! The run is configured by the environment variables listed in [`ENV_VARS`], e.g.
//!
//! ```bash
//! LOG_RESULTS=true TRAINING_EPISODE_COUNT=20 EVAL_EPISODE_COUNT=2 \
//!     cargo run --example notebook_dummy
//! ```
use anyhow::Result;
use chrono::Local;
use cyberbattle_core::{
    date_string,
    dummy::{DummyEnv, DummyEnvConfig, DummyLearner},
    epsilon_greedy_search,
    record::{NullRecorder, Recorder},
    run_trace, AgentWrapper, Env, EnvironmentBounds, Exploiter, Learner, RunConfig, TraceNaming,
    TraceRun, ENV_VARS,
};
use cyberbattle_tensorboard::TensorboardRecorder;
use log::info;
use std::{fs, path::Path};

const LOG_BASE: &str = "logs/exper";
const NOTEBOOK: &str = "notebook_dummy";
const ITERATION_COUNT: usize = 20;
const NODE_COUNT: usize = 4;

fn env_config(gymid: &str) -> DummyEnvConfig {
    DummyEnvConfig::default()
        .name(gymid)
        .rewards(vec![0.0, 1.0, -1.0, 3.0])
        .done_at(8)
        .node_count(NODE_COUNT)
        .detection_points(&["honeytoken"])
}

fn run(config: &RunConfig, log_dir: &Path, date: &str) -> Result<TraceRun> {
    let snapshot = config.snapshot();
    for name in ENV_VARS.iter() {
        info!("{}={}", name, snapshot.get(*name).map_or("", |v| v.as_str()));
    }
    if config.log_results {
        config.save_snapshot(log_dir)?;
    }

    let bounds = EnvironmentBounds::with_node_count(NODE_COUNT);
    let mut env = DummyEnv::build(&env_config(&config.gymid), 0)?;
    let mut learner = DummyLearner::default();

    // Training
    let mut trainer_config = config
        .trainer_config(format!("DQL {}", config.gymid), ITERATION_COUNT)
        .epsilon(0.9)
        .epsilon_minimum(0.1);
    let mut recorder: Box<dyn Recorder> = if config.log_results {
        let model = log_dir.join("training").join("model.tar");
        trainer_config = trainer_config
            .log_dir(log_dir)
            .save_model_filename(model.to_string_lossy());
        Box::new(TensorboardRecorder::new(log_dir.join("tensorboard")))
    } else {
        Box::new(NullRecorder::new())
    };
    let trained = epsilon_greedy_search(
        &mut env,
        &bounds,
        &mut learner,
        trainer_config,
        recorder.as_mut(),
    )?;
    info!("best running mean {}", trained.best_running_mean);
    if config.log_results {
        trained.save(log_dir.join("training").join("trained_learner.yaml"))?;
    }

    // Checkpoint
    let checkpoint = config.checkpoint_spec()?;
    if let Some(spec) = checkpoint {
        let dir = config.checkpoint_dir(LOG_BASE, NOTEBOOK, date);
        spec.load_into::<DummyEnv, _>(&mut learner, &dir, config.training_episode_count)?;
    }
    if !config.train_while_exploit {
        <DummyLearner as Learner<DummyEnv>>::eval(&mut learner);
    }

    // Trace
    let naming = TraceNaming {
        exploit_train: "exploit_train".to_string(),
        train_while_exploit: config.train_while_exploit,
        checkpoint,
    };
    let trace_dir = log_dir.join("trace");
    let mut wrapped = AgentWrapper::new(&mut env, &bounds);
    let render = if config.log_results {
        fs::create_dir_all(&trace_dir)?;
        Some((trace_dir.as_path(), &naming))
    } else {
        None
    };
    let trace = run_trace(
        &mut wrapped,
        &mut Exploiter::new(&mut learner),
        ITERATION_COUNT,
        render,
    )?;
    if config.log_results {
        trace.save(&trace_dir, &naming)?;
        wrapped.render_to(&trace_dir.join(naming.discovered_network_png()))?;
    }

    Ok(trace)
}

fn main() -> Result<()> {
    let config = RunConfig::from_env()?;
    config.init_logger()?;

    let date = date_string(&Local::now());
    let log_dir = config.log_dir_for(LOG_BASE, NOTEBOOK, &date);
    let trace = run(&config, &log_dir, &date)?;
    info!(
        "trace of {} steps, cumulative reward {}",
        trace.trace.len(),
        trace.trace.total_reward()
    );

    Ok(())
}
