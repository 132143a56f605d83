use clap::Parser;
use log::info;
use serde::Serialize;
use hyperstep::hydro::{Conserved, EquationOfState, Primitive};
use hyperstep::meshing::{Boundary, Mesh};
use hyperstep::{CFLRecoveryStrategy, HyperbolicModule, StepContext, TimeIntegrator, TimeSteppingScheme};




/**
 * Run Sod's shock tube with the reference update operator and write the
 * final profile as CBOR.
 */
#[derive(Debug, Parser)]
#[clap(version = "0.1", about = "Sod shock tube with invariant domain preserving time steps")]
struct Opts {
    #[clap(short = 'n', long, default_value = "400")]
    num_cells: usize,

    #[clap(short = 't', long, default_value = "0.2")]
    final_time: f64,

    #[clap(long, default_value = "erk 33")]
    scheme: TimeSteppingScheme,

    #[clap(long, default_value = "bang bang control")]
    recovery: CFLRecoveryStrategy,

    #[clap(long, default_value = "0.45")]
    cfl_min: f64,

    #[clap(long, default_value = "0.9")]
    cfl_max: f64,

    #[clap(short = 'g', long, default_value = "1.4")]
    gamma: f64,

    #[clap(short = 'j', long, default_value = "0")]
    num_threads: usize,

    #[clap(short = 'o', long, default_value = "shock_tube.cbor")]
    output: String,
}




/**
 * The simulation output: the mesh, the final time, and the conserved and
 * primitive profiles at the cell centers
 */
#[derive(Serialize)]
struct Profile {
    iteration: u64,
    time: f64,
    context: StepContext,
    equation_of_state: EquationOfState,
    mesh: Mesh,
    cell_centers: Vec<f64>,
    conserved: Vec<Conserved>,
    primitive: Vec<Primitive>,
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    if opts.num_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(opts.num_threads)
            .build_global()?;
    }
    info!("{:?}", opts);

    let eos = EquationOfState::polytropic(opts.gamma);
    let mesh = Mesh::new(0.0..1.0, opts.num_cells, Boundary::Transmissive);
    let context = StepContext::new(opts.cfl_min, opts.cfl_max, opts.recovery, opts.scheme);

    let mut u: Vec<Conserved> = mesh
        .cell_centers()
        .map(|x| if x < 0.5 { Primitive(1.0, 0.0, 1.0) } else { Primitive(0.125, 0.0, 0.1) })
        .map(|p| p.to_conserved(&eos))
        .collect();

    let mut integrator = TimeIntegrator::new(context, HyperbolicModule::serial(eos, mesh.clone())?)?;
    let mut iteration = 0;
    let mut time = 0.0;
    let mut restarts = 0;
    let start = std::time::Instant::now();

    integrator.prepare(u.len());

    while time < opts.final_time {
        let step = integrator.step(&mut u, time)?;

        time += step.tau;
        iteration += 1;

        if step.restarted {
            restarts += 1;
        }
        if iteration % 20 == 0 || step.violated {
            info!("[{}] t={:.4} dt={:.3e} cfl={} violated={}", iteration, time, step.tau, step.cfl, step.violated);
        }
    }

    info!("{} steps ({} restarted) in {:.3}s", iteration, restarts, start.elapsed().as_secs_f64());

    let primitive = u
        .iter()
        .map(|u| u.to_primitive(&eos))
        .collect::<Result<Vec<_>, _>>()?;

    let profile = Profile {
        iteration,
        time,
        context,
        equation_of_state: eos,
        cell_centers: mesh.cell_centers().collect(),
        mesh,
        conserved: u,
        primitive,
    };

    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&profile, &mut buffer)?;

    info!("write {}", opts.output);
    Ok(())
}
