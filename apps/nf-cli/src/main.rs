mod case;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nf_core::timing::{enable_timing, viscous_timing};
use nf_solver::{
    ConjugateHeat, Couplings, PassReport, SerialReducer, TurbulenceSource, ViscousSolver,
};

use crate::case::{Case, CaseResult};

#[derive(Parser)]
#[command(name = "nf-cli")]
#[command(about = "NavFlow CLI - near-wall viscous closure on channel cases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file against its mesh and couplings
    Check {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Run one viscous pass and report residual norms and monitors
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Log per-phase timings (same as setting NF_TIMING)
        #[arg(long)]
        timing: bool,
    },
}

fn main() -> CaseResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { case_path } => cmd_check(&case_path),
        Commands::Run {
            case_path,
            json,
            timing,
        } => {
            if timing {
                enable_timing();
            }
            cmd_run(&case_path, json)
        }
    }
}

fn cmd_check(case_path: &Path) -> CaseResult<()> {
    println!("Checking case: {}", case_path.display());
    let case = Case::load(case_path)?;
    case.validate()?;

    let mesh = case.build_mesh()?;
    let turbulence = case.turbulence_source();
    let conjugate = case.conjugate_partner();
    let couplings = Couplings {
        turbulence: turbulence.as_ref().map(|t| t as &dyn TurbulenceSource),
        conjugate: conjugate.as_ref().map(|c| c as &dyn ConjugateHeat),
        custom: None,
    };
    ViscousSolver::new(&mesh, case.solver.clone(), couplings)?;

    println!(
        "✓ Case is valid ({} nodes, {} edges, {} walls)",
        mesh.nodes().len(),
        mesh.edges().len(),
        case.solver.walls.len()
    );
    Ok(())
}

fn cmd_run(case_path: &Path, json: bool) -> CaseResult<()> {
    let case = Case::load(case_path)?;
    case.validate()?;

    let mesh = case.build_mesh()?;
    let turbulence = case.turbulence_source();
    let conjugate = case.conjugate_partner();
    let couplings = Couplings {
        turbulence: turbulence.as_ref().map(|t| t as &dyn TurbulenceSource),
        conjugate: conjugate.as_ref().map(|c| c as &dyn ConjugateHeat),
        custom: None,
    };

    let mut solver = ViscousSolver::new(&mesh, case.solver.clone(), couplings)?;
    let mut field = case.initial_field(&mesh, solver.fluid())?;
    let mut system = solver.new_system(&mesh);

    viscous_timing::reset_all();
    let report = solver.run_pass(&mesh, &mut field, &mut system, couplings, &SerialReducer)?;
    viscous_timing::log_summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PassReport) {
    println!("✓ Viscous pass completed");
    println!("  Wall nodes: {}", report.wall_nodes);
    println!("  Non-physical nodes: {}", report.preprocess.non_physical);
    if report.preprocess.wall_shear_unconverged > 0 {
        println!(
            "  Wall shear unconverged: {}",
            report.preprocess.wall_shear_unconverged
        );
    }
    println!("  Max vorticity: {:.6e}", report.preprocess.flow.max_vorticity);
    println!("  Max strain: {:.6e}", report.preprocess.flow.max_strain);

    let names = ["density", "momentum-x", "momentum-y", "momentum-z"];
    let last = report.residual_rms.len().saturating_sub(1);
    for (v, rms) in report.residual_rms.iter().enumerate() {
        let name = if v == last { "energy" } else { names[v] };
        println!("  RMS[{name}]: {rms:.6e}");
    }

    if let Some(buffet) = &report.buffet {
        println!("  Buffet metric: {:.6e}", buffet.total);
        for (marker, value) in &buffet.per_marker {
            println!("    {marker}: {value:.6e}");
        }
    }
}
