use efg_lite::game::{GameTree, Player};
use libgt::die_roll_poker::DieRollPoker;
use libgt::synthetic::{RandomGame, RandomGameConfig};
use libgt::GameTreeBuilder;
use lookahead_solving::{
    LookAheadConfig, LookAheadModelBuilder, NodeEvaluation, SequenceFormModel,
};
use optimizers::MicroLpSolver;

use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "LimitedLookAhead")]
struct Opt {
    // Either `random` or `drp` (die-roll poker).
    #[structopt(short = "g", long = "game", default_value = "random")]
    game: String,

    #[structopt(long = "num_sides", default_value = "2")]
    num_sides: usize,

    #[structopt(long = "depth", default_value = "3")]
    depth: usize,

    #[structopt(long = "branching", default_value = "2")]
    branching: usize,

    #[structopt(long = "seed", default_value = "0")]
    seed: u64,

    // Player to compute a best response for, 1 or 2.
    #[structopt(short = "p", long = "player", default_value = "1")]
    player: usize,

    #[structopt(short = "l", long = "look_ahead", default_value = "1")]
    look_ahead: usize,

    #[structopt(short = "e", long = "epsilon", default_value = "0.001")]
    epsilon: f64,

    // Half-width of the uniform noise added to the opponent's evaluations.
    #[structopt(short = "n", long = "noise", default_value = "0.0")]
    noise: f64,

    // Writes the lookahead model in CPLEX LP format before solving.
    #[structopt(short = "m", long = "model_file")]
    model_file: Option<PathBuf>,
}

fn make_game(opt: &Opt) -> Result<GameTree, Box<dyn std::error::Error>> {
    let game = match opt.game.as_str() {
        "random" => {
            let config = RandomGameConfig {
                depth: opt.depth,
                branching: opt.branching,
                ..Default::default()
            };
            let random_game = RandomGame::new(config, opt.seed);
            GameTreeBuilder::new().make_game(&random_game.initial_state())?
        }
        "drp" => {
            let drp = DieRollPoker::new(opt.num_sides);
            GameTreeBuilder::new().make_game(&drp.initial_state())?
        }
        other => return Err(format!("unknown game {}", other).into()),
    };
    Ok(game)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let opt = Opt::from_args();

    let player = match opt.player {
        1 => Player::Player1,
        2 => Player::Player2,
        other => return Err(format!("player must be 1 or 2, got {}", other).into()),
    };
    let game = make_game(&opt)?;
    info!("Game has {:?} nodes", game.num_nodes());

    let solver = MicroLpSolver::new();
    let base = SequenceFormModel::new(&game, player)?;
    let rational = base.solve(&solver)?;
    println!("Value against a rational opponent: {}", rational.objective_value());

    let evaluation = NodeEvaluation::new(opt.noise, opt.seed).table(&game, -player);
    let config = LookAheadConfig::new(opt.look_ahead).with_epsilon(opt.epsilon);
    let builder = LookAheadModelBuilder::build(&game, player, &evaluation, config)?;
    if let Some(model_file) = &opt.model_file {
        builder.model().write_lp_file(model_file)?;
    }

    let solution = builder.solve(&solver)?;
    println!("Value against a limited-lookahead opponent: {}", solution.objective_value);
    println!(
        "Value of that strategy against a rational opponent: {}",
        builder
            .sequence_form()
            .best_response_value(&solution.strategy)?
    );
    let treeplex = builder.sequence_form().dual_treeplex();
    let deactivated = (0..treeplex.num_sequences())
        .filter(|&seq| solution.is_deactivated(seq))
        .map(|seq| treeplex.sequence_name(seq))
        .collect::<Vec<_>>();
    println!("Deactivated opponent sequences: {:?}", deactivated);
    Ok(())
}
