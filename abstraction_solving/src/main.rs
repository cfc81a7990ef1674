use abstraction_solving::{AbstractionConfig, AbstractionModelBuilder};
use optimizers::MicroLpSolver;

use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "SignalAbstraction")]
struct Opt {
    // Number of sides of each die.
    #[structopt(short = "s", long = "num_sides", default_value = "3")]
    num_sides: usize,

    // Number of abstract buckets, lossless (2 * num_sides - 1) if not provided.
    #[structopt(short = "b", long = "num_buckets")]
    num_buckets: Option<usize>,

    // Payoff scale. Taken from die-roll poker with `num_sides` if not provided.
    #[structopt(short = "p", long = "largest_payoff")]
    largest_payoff: Option<f64>,

    #[structopt(long = "no_symmetry_breaking")]
    no_symmetry_breaking: bool,

    // Writes the model in CPLEX LP format before solving.
    #[structopt(short = "m", long = "model_file")]
    model_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let opt = Opt::from_args();

    let num_buckets = opt
        .num_buckets
        .unwrap_or_else(|| AbstractionConfig::lossless_num_buckets(opt.num_sides));
    let mut config = match opt.largest_payoff {
        Some(largest_payoff) => AbstractionConfig::new(opt.num_sides, num_buckets, largest_payoff),
        None => AbstractionConfig::for_die_roll_poker(opt.num_sides, num_buckets)?,
    };
    config.break_symmetry = !opt.no_symmetry_breaking;
    info!("{:?}", config);

    let mut builder = AbstractionModelBuilder::new(config);
    builder.build_model()?;
    if let (Some(model_file), Some(model)) = (&opt.model_file, builder.model()) {
        model.write_lp_file(model_file)?;
    }

    let objective_value = builder.solve(&MicroLpSolver::new())?;
    let abstraction = builder.extract_abstraction()?;
    println!("Abstraction value: {}", objective_value);
    println!("{} classes", abstraction.num_classes());
    print!("{}", abstraction);
    Ok(())
}
