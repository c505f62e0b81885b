use anyhow::Result;
use cyberbattle_core::{
    dummy::{DummyEnv, DummyEnvConfig, DummyLearner},
    error::CyberBattleError,
    run_trace, AgentWrapper, Command, CommandScript, Env, EnvironmentBounds, EpisodeTrace,
    Exploiter, Scripted, TraceNaming,
};
use std::fs;
use tempdir::TempDir;

fn script() -> CommandScript {
    CommandScript::new(vec![
        Command::Local {
            node: "n0".to_string(),
            vulnerability: "ScanPageSource".to_string(),
        },
        Command::Remote {
            source: "n1".to_string(),
            vulnerability: "GET_/v2/users".to_string(),
            profile: "username=LisaGates".to_string(),
            property: String::new(),
        },
        Command::Connect {
            source: "n0".to_string(),
            target: "n2".to_string(),
            port: "HTTPS".to_string(),
            credential: "cred_1".to_string(),
        },
    ])
}

fn naming() -> TraceNaming {
    TraceNaming {
        exploit_train: "exploit_manual".to_string(),
        train_while_exploit: false,
        checkpoint: None,
    }
}

#[test]
fn test_scripted_trace() -> Result<()> {
    let dir = TempDir::new("trace")?;
    let config = DummyEnvConfig::default().rewards(vec![5.0, -1.0, 14.0]);
    let mut env = DummyEnv::build(&config, 0)?;
    let bounds = EnvironmentBounds::with_node_count(4);
    let mut wrapped = AgentWrapper::new(&mut env, &bounds);
    let script = script();
    let naming = naming();

    // The script is longer than max_steps
    let run = run_trace(
        &mut wrapped,
        &mut Scripted::new(&script),
        2,
        Some((dir.path(), &naming)),
    )?;
    let rows = run.trace.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().map(|r| r.step).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(
        rows.iter().map(|r| r.cumulative_reward).collect::<Vec<_>>(),
        vec![5.0, 4.0, 18.0]
    );
    assert_eq!(
        rows.iter().map(|r| r.next_action.as_str()).collect::<Vec<_>>(),
        vec!["local:n0", "remote:n1", "connect:n2"]
    );
    assert!(rows.iter().all(|r| r.processed_by == "manual"));
    assert_eq!(rows[1].precondition, "step2");
    assert_eq!(rows[2].reward_string, "reward 14");
    assert_eq!(run.last_index, 2);
    assert!(!run.done);
    for i in 0..3 {
        assert!(dir.path().join(naming.output_result_png(i)).exists());
    }

    run.save(dir.path(), &naming)?;
    let path = dir
        .path()
        .join("exploit_manual__step2_checkpointNone_episodes_actions.csv");
    let content = fs::read_to_string(&path)?;
    assert!(content.starts_with(
        "Step,Reward,Cumulative Reward,Next action,Processed by,Precondition,Profile,Reward string\n"
    ));
    assert_eq!(EpisodeTrace::read_csv(&path)?, run.trace);

    // Steps restart with a new episode
    let run = run_trace(&mut wrapped, &mut Scripted::new(&script), 0, None)?;
    assert_eq!(run.trace.rows()[0].step, 0);
    assert_eq!(run.trace.rows()[0].cumulative_reward, 5.0);
    Ok(())
}

#[test]
fn test_exploit_trace_stops_when_done() -> Result<()> {
    let config = DummyEnvConfig::default().rewards(vec![1.0]).done_at(2);
    let mut env = DummyEnv::build(&config, 0)?;
    let bounds = EnvironmentBounds::with_node_count(4);
    let mut wrapped = AgentWrapper::new(&mut env, &bounds);
    let mut learner = DummyLearner::default();

    let run = run_trace(&mut wrapped, &mut Exploiter::new(&mut learner), 10, None)?;
    assert_eq!(run.trace.len(), 2);
    assert_eq!(run.last_index, 2);
    assert!(run.done);
    assert_eq!(run.trace.total_reward(), 2.0);
    assert!(run.trace.rows().iter().all(|r| r.processed_by == "exploit"));
    assert_eq!(learner.exploit_count, 2);
    Ok(())
}

#[test]
fn test_trace_soft_stop() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
    let bounds = EnvironmentBounds::with_node_count(4);
    let mut wrapped = AgentWrapper::new(&mut env, &bounds);
    let script = CommandScript::new(script().commands[..1].to_vec());

    let run = run_trace(&mut wrapped, &mut Scripted::new(&script), 5, None)?;
    assert_eq!(run.trace.len(), 1);
    assert_eq!(run.last_index, 1);
    assert!(!run.done);
    Ok(())
}

#[test]
fn test_unsupported_command() -> Result<()> {
    let mut env = DummyEnv::build(&DummyEnvConfig::default(), 0)?;
    let bounds = EnvironmentBounds::with_node_count(4);
    let mut wrapped = AgentWrapper::new(&mut env, &bounds);
    let script = CommandScript::new(vec![Command::Local {
        node: "n9".to_string(),
        vulnerability: "ScanPageSource".to_string(),
    }]);

    let err = run_trace(&mut wrapped, &mut Scripted::new(&script), 1, None).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CyberBattleError>(),
        Some(&CyberBattleError::UnsupportedCommand("unknown node n9".to_string()))
    );
    Ok(())
}
