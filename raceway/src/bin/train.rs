//! Trains the driving agent on the ring circuit.
use anyhow::Result;
use clap::Parser;
use csv::WriterBuilder;
use log::info;
use serde::Serialize;
use std::{convert::TryFrom, fs::File};

use raceway_candle_agent::{
    dqn::{Dqn, DqnConfig, DqnModelConfig, EpsilonGreedy},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    Device, TensorBatch,
};
use raceway_core::{
    record::{AggregateRecorder, BufferedRecorder, LogRecorder, Record},
    replay_buffer::{
        OneStepProcessor, OneStepProcessorConfig, UniformReplayBuffer, UniformReplayBufferConfig,
    },
    util::eval_with_recorder,
    Agent, DefaultEvaluator, Env, Policy, Trainer, TrainerConfig,
};
use raceway_track_env::{TrackEnv, TrackEnvConfig};

type ObsBatch = TensorBatch;
type ActBatch = TensorBatch;
type ReplayBuffer = UniformReplayBuffer<ObsBatch, ActBatch>;
type StepProc = OneStepProcessor<TrackEnv, ObsBatch, ActBatch>;

#[derive(Debug, Parser)]
#[command(name = "train", about = "Trains the raceway driving agent")]
struct Args {
    /// Number of optimization steps.
    #[arg(long, default_value_t = 100_000)]
    max_opts: usize,

    /// Capacity of the replay buffer.
    #[arg(long, default_value_t = 1_000_000)]
    capacity: usize,

    /// Batch size.
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Discount factor.
    #[arg(long, default_value_t = 0.99)]
    gamma: f64,

    /// Learning rate of the optimizer.
    #[arg(long, default_value_t = 1e-4)]
    lr: f64,

    /// Initial exploration rate.
    #[arg(long, default_value_t = 1.0)]
    eps_start: f64,

    /// Floor of the exploration rate.
    #[arg(long, default_value_t = 0.002)]
    eps_final: f64,

    /// Exploration decay per optimization step.
    #[arg(long, default_value_t = 0.00025)]
    eps_step: f64,

    /// Width of the two hidden layers of the Q-network.
    #[arg(long, default_value_t = 256)]
    hidden: i64,

    /// Directory where the model is saved.
    #[arg(long, default_value = "model/dqn_track")]
    model_dir: String,

    /// Number of episodes per evaluation.
    #[arg(long, default_value_t = 5)]
    eval_episodes: usize,

    /// Writes the evaluation records to this CSV file.
    #[arg(long)]
    eval_csv: Option<String>,

    /// Skips training and only evaluates a saved model.
    #[arg(long)]
    skip_training: bool,
}

fn create_agent(args: &Args, env_config: &TrackEnvConfig) -> Dqn<TrackEnv, Mlp, ReplayBuffer> {
    let model_config = DqnModelConfig::default()
        .q_config(MlpConfig::new(
            env_config.obs_dim() as i64,
            vec![args.hidden, args.hidden],
            env_config.n_actions() as i64,
            false,
        ))
        .opt_config(OptimizerConfig::default().learning_rate(args.lr));
    let config = DqnConfig::default()
        .model_config(model_config)
        .batch_size(args.batch_size)
        .discount_factor(args.gamma)
        .explorer(
            EpsilonGreedy::new()
                .eps_start(args.eps_start)
                .eps_final(args.eps_final)
                .eps_step(args.eps_step),
        )
        .device(Device::Cpu);

    Dqn::build(config)
}

#[derive(Debug, Serialize)]
struct EvalRecord {
    episode: usize,
    step: usize,
    reward: f32,
}

impl TryFrom<&Record> for EvalRecord {
    type Error = anyhow::Error;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            episode: record.get_scalar("episode")? as _,
            step: record.get_scalar("step")? as _,
            reward: record.get_scalar("reward")?,
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let env_config = TrackEnvConfig::default();

    if !args.skip_training {
        let trainer_config = TrainerConfig::default()
            .max_opts(args.max_opts)
            .opt_interval(1)
            .eval_interval(5_000)
            .flush_record_interval(1_000)
            .record_compute_cost_interval(1_000)
            .record_agent_info_interval(100)
            .warmup_period(args.batch_size)
            .save_interval(50_000)
            .model_dir(args.model_dir.clone());
        let mut trainer = Trainer::<TrackEnv, StepProc, ReplayBuffer>::build(
            trainer_config,
            env_config.clone(),
            OneStepProcessorConfig::default(),
            UniformReplayBufferConfig::default().capacity(args.capacity),
        );
        let mut agent = create_agent(&args, &env_config);
        let mut recorder: Box<dyn AggregateRecorder> = Box::new(LogRecorder::new());
        let mut evaluator = DefaultEvaluator::<TrackEnv>::new(&env_config, 0, args.eval_episodes)?;

        trainer.train(&mut agent, &mut recorder, &mut evaluator)?;
        agent.save(&args.model_dir)?;
        info!("Saved the trained model in {}", args.model_dir);
    }

    let mut env = TrackEnv::build(&env_config, 0)?;
    let mut agent = create_agent(&args, &env_config);
    agent.load(&args.model_dir)?;
    agent.eval();

    let mut recorder = BufferedRecorder::new();
    let returns = eval_with_recorder(&mut env, &mut agent, args.eval_episodes, &mut recorder)?;
    for (episode, r) in returns.iter().enumerate() {
        info!("Episode {}: return = {}", episode, r);
    }

    if let Some(path) = &args.eval_csv {
        let mut wtr = WriterBuilder::new().from_writer(File::create(path)?);
        for record in recorder.iter() {
            wtr.serialize(EvalRecord::try_from(record)?)?;
        }
        info!("Wrote evaluation records to {}", path);
    }

    Ok(())
}
