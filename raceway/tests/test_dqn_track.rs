//! End-to-end tests of the DQN agent on the track environment.
use anyhow::Result;
use std::fs;
use tempdir::TempDir;

use raceway_candle_agent::{
    dqn::{Dqn, DqnConfig, DqnModelConfig, EpsilonGreedy},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    Device, TensorBatch,
};
use raceway_core::{
    record::{AggregateRecorder, NullRecorder},
    replay_buffer::{
        OneStepProcessor, OneStepProcessorConfig, UniformReplayBuffer, UniformReplayBufferConfig,
    },
    Agent, DefaultEvaluator, Env, ExperienceBufferBase, Policy, ReplayBufferBase, Sampler,
    StepProcessor, Trainer, TrainerConfig,
};
use raceway_track_env::{TrackEnv, TrackEnvConfig};

type ObsBatch = TensorBatch;
type ActBatch = TensorBatch;
type ReplayBuffer = UniformReplayBuffer<ObsBatch, ActBatch>;
type StepProc = OneStepProcessor<TrackEnv, ObsBatch, ActBatch>;

const BATCH_SIZE: usize = 4;
const GAMMA: f64 = 0.9;
const CAPACITY: usize = 10;

fn env_config() -> TrackEnvConfig {
    TrackEnvConfig::default()
        .track_size(60, 40, 8)
        .car_half_width(1.5)
        .ray_length(50)
        .max_steps(100)
}

fn create_agent(env_config: &TrackEnvConfig) -> Dqn<TrackEnv, Mlp, ReplayBuffer> {
    let model_config = DqnModelConfig::default()
        .q_config(MlpConfig::new(
            env_config.obs_dim() as i64,
            vec![32, 32],
            env_config.n_actions() as i64,
            false,
        ))
        .opt_config(OptimizerConfig::default().learning_rate(1e-3));
    let config = DqnConfig::default()
        .model_config(model_config)
        .batch_size(BATCH_SIZE)
        .discount_factor(GAMMA)
        .explorer(EpsilonGreedy::new())
        .device(Device::Cpu);

    Dqn::build(config)
}

#[test]
fn learning_starts_once_a_batch_fits() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let env_config = env_config();
    let env = TrackEnv::build(&env_config, 0)?;
    let step_proc = StepProc::build(&OneStepProcessorConfig::default());
    let mut buffer = ReplayBuffer::build(
        &UniformReplayBufferConfig::default()
            .capacity(CAPACITY)
            .seed(7),
    );
    let mut sampler = Sampler::new(env, step_proc);
    let mut agent = create_agent(&env_config);
    agent.train();

    let dir = TempDir::new("dqn_track")?;

    // Three transitions are less than a batch: the optimization step is a
    // no-op, parameters stay bit-for-bit identical and the exploration
    // rate is not decayed.
    for _ in 0..3 {
        sampler.sample_and_push(&mut agent, &mut buffer)?;
    }
    assert_eq!(buffer.len(), 3);

    let eps_before = agent.exploration_rate();
    agent.save(dir.path().join("before"))?;
    assert!(agent.opt(&mut buffer).is_none());
    agent.save(dir.path().join("after_noop"))?;
    assert_eq!(agent.exploration_rate(), eps_before);
    assert_eq!(agent.n_opts(), 0);

    let before = fs::read(dir.path().join("before").join("qnet.safetensors"))?;
    let after_noop = fs::read(dir.path().join("after_noop").join("qnet.safetensors"))?;
    assert_eq!(before, after_noop);

    // Two more transitions make five; the optimization step now samples a
    // batch of four, produces a finite loss and changes the parameters.
    for _ in 0..2 {
        sampler.sample_and_push(&mut agent, &mut buffer)?;
    }
    assert_eq!(buffer.len(), 5);

    let record = agent.opt(&mut buffer).expect("optimization step should run");
    let loss = record.get_scalar("loss_critic")?;
    assert!(loss.is_finite());
    assert!(agent.exploration_rate() < eps_before);
    assert_eq!(agent.n_opts(), 1);

    agent.save(dir.path().join("after_opt"))?;
    let after_opt = fs::read(dir.path().join("after_opt").join("qnet.safetensors"))?;
    assert_ne!(before, after_opt);

    Ok(())
}

#[test]
fn greedy_actions_are_deterministic() -> Result<()> {
    let env_config = env_config();
    let mut env = TrackEnv::build(&env_config, 0)?;
    let mut agent = create_agent(&env_config);
    agent.eval();

    let obs = env.reset(None)?;
    let a0 = agent.sample(&obs).0;
    for _ in 0..10 {
        assert_eq!(agent.sample(&obs).0, a0);
    }
    Ok(())
}

#[test]
fn saved_agent_restores_greedy_policy_and_eps() -> Result<()> {
    let env_config = env_config();
    let mut env = TrackEnv::build(&env_config, 0)?;
    let dir = TempDir::new("dqn_track_save")?;

    let mut agent = create_agent(&env_config);
    let step_proc = StepProc::build(&OneStepProcessorConfig::default());
    let mut buffer = ReplayBuffer::build(
        &UniformReplayBufferConfig::default()
            .capacity(CAPACITY)
            .seed(11),
    );
    let mut sampler = Sampler::new(TrackEnv::build(&env_config, 0)?, step_proc);
    agent.train();
    for _ in 0..BATCH_SIZE {
        sampler.sample_and_push(&mut agent, &mut buffer)?;
    }
    agent.opt(&mut buffer).expect("optimization step should run");
    agent.save(dir.path())?;

    let mut restored = create_agent(&env_config);
    restored.load(dir.path())?;
    assert_eq!(restored.exploration_rate(), agent.exploration_rate());

    agent.eval();
    restored.eval();
    let obs = env.reset(None)?;
    assert_eq!(agent.sample(&obs).0, restored.sample(&obs).0);
    Ok(())
}

#[test]
fn trainer_runs_end_to_end() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let env_config = env_config();
    let dir = TempDir::new("dqn_track_trainer")?;
    let trainer_config = TrainerConfig::default()
        .max_opts(10)
        .opt_interval(1)
        .eval_interval(5)
        .flush_record_interval(10)
        .record_agent_info_interval(1)
        .warmup_period(BATCH_SIZE)
        .model_dir(dir.path().to_str().unwrap())
        .save_interval(usize::MAX);
    let mut trainer = Trainer::<TrackEnv, StepProc, ReplayBuffer>::build(
        trainer_config,
        env_config.clone(),
        OneStepProcessorConfig::default(),
        UniformReplayBufferConfig::default().capacity(100),
    );
    let mut agent = create_agent(&env_config);
    let mut recorder: Box<dyn AggregateRecorder> = Box::new(NullRecorder {});
    let mut evaluator = DefaultEvaluator::<TrackEnv>::new(&env_config, 0, 1)?;

    trainer.train(&mut agent, &mut recorder, &mut evaluator)?;
    assert_eq!(agent.n_opts(), 10);

    Ok(())
}
