use anyhow::Result;
use cyberbattle_core::{
    dummy::{DummyEnv, DummyEnvConfig, DummyLearner},
    epsilon_greedy_search,
    record::{BufferedRecorder, NullRecorder},
    transfer_learning_evaluation, CheckpointSpec, DetectionPointsResults, Env, EnvironmentBounds,
    HParamValue, HParams, RandomPolicy, TrainedLearner, TrainerConfig, TransferConfig, Verbosity,
    STEP_KEY,
};
use std::{fs::File, path::Path};
use tempdir::TempDir;

fn bounds() -> EnvironmentBounds {
    EnvironmentBounds::with_node_count(4)
}

fn epsilons(recorder: &BufferedRecorder) -> Result<Vec<f32>> {
    let epsilons = recorder
        .iter()
        .map(|r| r.get_scalar("training/epsilon"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(epsilons)
}

#[test]
fn test_training_loop_stops_at_step_budget() -> Result<()> {
    let env_config = DummyEnvConfig::default().rewards(vec![1.0, 0.0]).done_at(3);
    let mut env = DummyEnv::build(&env_config, 0)?;
    let mut learner = DummyLearner::default();
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .title("dummy")
        .episode_count(4)
        .iteration_count(5)
        .verbosity(Verbosity::Verbose);

    let result = epsilon_greedy_search(&mut env, &bounds(), &mut learner, config, &mut recorder)?;

    // 4 * 5 steps with episodes of 3 steps
    assert_eq!(result.episode_count(), 7);
    assert!(result.episode_lengths.iter().all(|&l| l == 3));
    assert_eq!(result.episode_sums(), vec![2.0; 7]);
    assert_eq!(result.best_running_mean, 2.0);
    assert_eq!(result.trained_on, "DummyEnv-v0");
    assert_eq!(env.reset_count, 7);
    assert_eq!(learner.new_episode_count, 7);
    assert_eq!(learner.on_step_count, 21);
    assert_eq!(learner.exploit_count, 0);
    assert_eq!(learner.episode_ends.last(), Some(&(7, 3)));

    let steps = recorder
        .iter()
        .map(|r| r.get_scalar(STEP_KEY))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(steps, vec![3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0]);
    for record in recorder.iter() {
        assert_eq!(record.get_scalar("total_reward")?, 2.0);
        assert_eq!(record.get_scalar("training/n_positive_actions")?, 2.0);
        assert_eq!(record.get_scalar("loss")?, 0.5);
    }
    Ok(())
}

#[test]
fn test_episode_budget_when_never_done() -> Result<()> {
    let env_config = DummyEnvConfig::default().rewards(vec![-1.0, 2.0]);
    let mut env = DummyEnv::build(&env_config, 0)?;
    let mut learner = DummyLearner::default();
    let config = TrainerConfig::default()
        .episode_count(3)
        .iteration_count(4)
        .epsilon(0.0);

    let result =
        epsilon_greedy_search(&mut env, &bounds(), &mut learner, config, &mut NullRecorder::new())?;

    assert_eq!(result.episode_lengths, vec![4, 4, 4]);
    assert_eq!(learner.explore_count, 0);
    assert_eq!(learner.exploit_count, 12);
    for (rewards, availability) in result
        .all_episodes_rewards
        .iter()
        .zip(result.all_episodes_availability.iter())
    {
        assert_eq!(rewards, &vec![-1.0, 2.0, -1.0, 2.0]);
        assert_eq!(availability, &vec![0.5, 1.0, 0.5, 1.0]);
    }
    Ok(())
}

#[test]
fn test_training_stops_without_action() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
    let mut learner = DummyLearner::default()
        .exploit_none_every(1)
        .explore_budget(0);
    let config = TrainerConfig::default()
        .episode_count(10)
        .iteration_count(10)
        .epsilon(0.0);

    let result =
        epsilon_greedy_search(&mut env, &bounds(), &mut learner, config, &mut NullRecorder::new())?;
    assert_eq!(result.episode_lengths, vec![0]);
    Ok(())
}

#[test]
fn test_evaluation_and_artifacts() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let log_dir = dir.path().join("logs");
    let model = dir.path().join("model.tar");
    let env_config = DummyEnvConfig::default()
        .rewards(vec![2.0, -1.0])
        .done_at(4)
        .detection_points(&["honeytoken"]);
    let mut env = DummyEnv::build(&env_config, 0)?;
    let mut learner = DummyLearner::default();
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .title("dummy")
        .episode_count(5)
        .iteration_count(4)
        .eval_episode_count(1)
        .eval_freq(1)
        .log_dir(&log_dir)
        .save_model_filename(model.to_string_lossy());

    let result = epsilon_greedy_search(&mut env, &bounds(), &mut learner, config, &mut recorder)?;
    assert_eq!(result.episode_count(), 5);

    // One evaluation episode after each training episode
    assert_eq!(learner.new_episode_count, 10);
    assert_eq!(learner.on_step_count, 20);
    assert_eq!(learner.eval_count, 5);
    assert!(learner.training);
    assert_eq!(recorder.len(), 10);
    let eval_steps = recorder
        .iter()
        .filter(|r| r.get("eval_run_mean").is_some())
        .map(|r| r.get_scalar(STEP_KEY))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(eval_steps, vec![8.0, 12.0, 16.0, 20.0, 24.0]);

    // Checkpoints are saved on the first improvement of the running means
    assert!(dir.path().join("model_steps4.tar").exists());
    assert!(dir.path().join("model_best.tar").exists());
    assert!(dir.path().join("model_eval_steps8.tar").exists());
    assert!(dir.path().join("model_eval_best.tar").exists());
    assert!(!dir.path().join("model_steps8.tar").exists());

    let training_dir = log_dir.join("training");
    let results = DetectionPointsResults::load(training_dir.join("detection_points_results.json"))?;
    let series = results.get("honeytoken").unwrap();
    assert_eq!(series.indices, [2usize, 4].repeat(5));
    assert_eq!(series.indptr, vec![0, 2, 4, 6, 8, 10]);
    assert_eq!(series.eplength, vec![4; 5]);
    assert!(training_dir.join("detection_points_results_e5.json").exists());
    assert!(training_dir
        .join("detection_points_results_eval_trainsteps20.json")
        .exists());

    let hparams: HParams = serde_yaml::from_reader(File::open(training_dir.join("hparams.yaml"))?)?;
    assert_eq!(hparams.get("gymid"), Some(&HParamValue::Text("DummyEnv-v0".to_string())));
    assert_eq!(hparams.get("date"), Some(&HParamValue::Text("logs".to_string())));
    assert_eq!(hparams.get("agent"), Some(&HParamValue::Text("DummyLearner".to_string())));
    assert_eq!(hparams.get("gamma"), Some(&HParamValue::Float(0.015)));
    assert_eq!(hparams.get("replay_memory_size"), Some(&HParamValue::Int(10000)));
    assert_eq!(hparams.hparam_domain_discrete["gamma"].len(), 4);
    Ok(())
}

#[test]
fn test_transfer_learning_evaluation() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default().rewards(vec![1.0]), 0)?;
    let mut learner = DummyLearner::default();
    let config = TrainerConfig::default().episode_count(2).iteration_count(3);
    let trained =
        epsilon_greedy_search(&mut env, &bounds(), &mut learner, config, &mut NullRecorder::new())?;

    let eval_config = DummyEnvConfig::default().name("Other-v0").rewards(vec![0.0, 3.0]);
    let mut eval_env = DummyEnv::build(&eval_config, 1)?;
    let transfer = TransferConfig {
        eval_episode_count: 3,
        iteration_count: 4,
        ..TransferConfig::default()
    };
    let results = transfer_learning_evaluation(
        &bounds(),
        &trained,
        &mut learner,
        &mut eval_env,
        &mut RandomPolicy::new(),
        &transfer,
        &mut NullRecorder::new(),
    )?;

    assert!(results
        .trained
        .title
        .starts_with("One shot on Other-v0 - Trained on DummyEnv-v0 (epochs=3, ϵ=0,"));
    assert!(results.benchmark.title.starts_with("Benchmark (epochs=3, ϵ=1,"));
    assert_eq!(results.trained.episode_sums(), vec![6.0; 3]);
    assert_eq!(results.benchmark.episode_sums(), vec![6.0; 3]);
    assert!(results
        .title
        .starts_with("Transfer learning DummyEnv-v0->Other-v0 -- max_nodes=4, episodes=3,\n"));
    Ok(())
}

#[test]
fn test_last_episode_rewards_are_rendered() -> Result<()> {
    let dir = TempDir::new("render")?;
    let env_config = DummyEnvConfig::default().rewards(vec![1.0, 0.0, 2.0]).done_at(3);
    let mut env = DummyEnv::build(&env_config, 0)?;
    let config = TrainerConfig::default()
        .episode_count(2)
        .iteration_count(3)
        .epsilon(0.0)
        .render_last_episode_rewards_to(dir.path());

    epsilon_greedy_search(
        &mut env,
        &bounds(),
        &mut DummyLearner::default(),
        config,
        &mut NullRecorder::new(),
    )?;

    // Only the positive-reward steps of the last episode
    assert!(dir.path().join("e2-s1.png").exists());
    assert!(dir.path().join("e2-s2.png").exists());
    assert!(!dir.path().join("e2-s3.png").exists());
    assert!(!dir.path().join("e1-s1.png").exists());
    Ok(())
}

#[test]
fn test_only_eval_summary() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default().rewards(vec![1.0]), 0)?;
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .episode_count(3)
        .iteration_count(2)
        .eval_episode_count(1)
        .eval_freq(1)
        .only_eval_summary(true);

    epsilon_greedy_search(&mut env, &bounds(), &mut DummyLearner::default(), config, &mut recorder)?;

    assert_eq!(recorder.len(), 3);
    for record in recorder.iter() {
        assert!(record.get("eval_run_mean").is_some());
        assert!(record.get("training/epsilon").is_none());
        assert!(record.get("total_reward").is_none());
    }
    Ok(())
}

#[test]
fn test_mixed_selection() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
    let mut learner = DummyLearner::default();
    let config = TrainerConfig::default()
        .episode_count(4)
        .iteration_count(10)
        .epsilon(0.5)
        .seed(42);

    let result =
        epsilon_greedy_search(&mut env, &bounds(), &mut learner, config, &mut NullRecorder::new())?;

    assert_eq!(result.episode_lengths, vec![10; 4]);
    assert!(learner.explore_count > 0);
    assert!(learner.exploit_count > 0);
    assert_eq!(learner.explore_count + learner.exploit_count, 40);
    assert_eq!(learner.on_step_count, 40);
    Ok(())
}

#[test]
fn test_exponential_decay_across_episodes() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .episode_count(4)
        .iteration_count(2)
        .epsilon(1.0)
        .epsilon_minimum(0.1)
        .epsilon_exponential_decay(Some(1));

    epsilon_greedy_search(&mut env, &bounds(), &mut DummyLearner::default(), config, &mut recorder)?;

    // 2 steps per episode, exp(-5 * steps_done / 2)
    let epsilons = epsilons(&recorder)?;
    assert_eq!(epsilons.len(), 4);
    for (i, eps) in epsilons.iter().enumerate() {
        let expected = 0.1 + (-5.0 * i as f64).exp() * 0.9;
        assert!((*eps as f64 - expected).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_multiplicative_decay_across_episodes() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .episode_count(4)
        .iteration_count(2)
        .epsilon(1.0)
        .epsilon_minimum(0.2)
        .epsilon_multdecay(0.5);

    epsilon_greedy_search(&mut env, &bounds(), &mut DummyLearner::default(), config, &mut recorder)?;

    assert_eq!(epsilons(&recorder)?, vec![1.0, 0.5, 0.25, 0.2]);
    Ok(())
}

#[test]
fn test_checkpoint_load_into() -> Result<()> {
    let dir = Path::new("logs/exper/run/DummyEnv-v0/20240101_120000");
    let mut learner = DummyLearner::default();

    CheckpointSpec::Steps(42).load_into::<DummyEnv, _>(&mut learner, dir, 3000)?;
    CheckpointSpec::Best.load_into::<DummyEnv, _>(&mut learner, dir, 3000)?;

    assert_eq!(
        learner.loaded,
        vec![dir
            .join("training")
            .join("exploit_train__trainepisodes3000_best_modelevaluation_stepsdone_42.tar")]
    );
    assert_eq!(learner.loaded_best, vec![dir.join("training")]);
    Ok(())
}

#[test]
fn test_save_and_load_trained_learner() -> Result<()> {
    let dir = TempDir::new("trained_learner")?;
    let env_config = DummyEnvConfig::default().rewards(vec![2.0, -1.0]).done_at(3);
    let mut env = DummyEnv::build(&env_config, 0)?;
    let config = TrainerConfig::default()
        .title("dummy")
        .episode_count(3)
        .iteration_count(3);
    let result = epsilon_greedy_search(
        &mut env,
        &bounds(),
        &mut DummyLearner::default(),
        config,
        &mut NullRecorder::new(),
    )?;

    let path = dir.path().join("trained.yaml");
    result.save(&path)?;
    let loaded = TrainedLearner::load(&path)?;
    assert_eq!(loaded, result);
    assert_eq!(loaded.episode_sums(), vec![3.0; 3]);
    Ok(())
}
