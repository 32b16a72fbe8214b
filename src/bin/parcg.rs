//! Command-line driver: load A and b on rank 0, broadcast, solve, write x.
//!
//! Exit codes: 0 success, 1 matrix read failure, 2 right hand side read
//! failure, 3 matrix not square, 4 right hand side length mismatch, 5 right
//! hand side not a single column, 6 solution write failure, 7 solver setup
//! failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parcg::core::wrappers::true_relative_residual;
use parcg::io::{read_matrix_file, write_vector_file};
use parcg::parallel::{run_participants, Comm, KernelPool, UniverseComm};
use parcg::{CgSolver, DenseMatrix, ParticipantContext, SolverOptions};

const ROOT: usize = 0;

#[derive(Parser, Debug)]
#[command(name = "parcg")]
#[command(about = "Solve a dense SPD system A x = b with distributed Conjugate Gradient")]
struct Args {
    /// Binary matrix file (u64 rows, u64 cols, row-major f64, little-endian)
    #[arg(default_value = "io/matrix.bin")]
    matrix_file: PathBuf,

    /// Binary right hand side file (N x 1)
    #[arg(default_value = "io/rhs.bin")]
    rhs_file: PathBuf,

    /// Output file for the solution (N x 1)
    #[arg(default_value = "io/sol.bin")]
    sol_file: PathBuf,

    /// Maximum number of iterations [default: PARCG_MAX_ITERS or 1000]
    max_iters: Option<usize>,

    /// Relative residual tolerance [default: PARCG_REL_TOL or 1e-9]
    rel_tol: Option<f64>,

    /// In-process participants (N must be a multiple of this)
    #[arg(short = 'p', long, default_value_t = 1)]
    participants: usize,

    /// Kernel threads per participant [default: PARCG_NUM_THREADS or all cores]
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Run one participant per MPI process instead of in-process threads
    #[cfg(feature = "mpi")]
    #[arg(long)]
    mpi: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Exit {
    Success = 0,
    MatrixRead = 1,
    RhsRead = 2,
    NotSquare = 3,
    RhsLength = 4,
    RhsColumns = 5,
    SolutionWrite = 6,
    Setup = 7,
}

impl Exit {
    fn from_code(code: u8) -> Self {
        match code {
            0 => Exit::Success,
            1 => Exit::MatrixRead,
            2 => Exit::RhsRead,
            3 => Exit::NotSquare,
            4 => Exit::RhsLength,
            5 => Exit::RhsColumns,
            6 => Exit::SolutionWrite,
            _ => Exit::Setup,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Rank 0 only: read and validate the system.
fn load_system(args: &Args) -> Result<(DenseMatrix, Vec<f64>), Exit> {
    tracing::info!("Reading matrix from {} ...", args.matrix_file.display());
    let a = read_matrix_file(&args.matrix_file).map_err(|e| {
        tracing::error!("Failed to read matrix: {e}");
        Exit::MatrixRead
    })?;
    tracing::info!("Reading right hand side from {} ...", args.rhs_file.display());
    let rhs = read_matrix_file(&args.rhs_file).map_err(|e| {
        tracing::error!("Failed to read right hand side: {e}");
        Exit::RhsRead
    })?;

    if !a.is_square() {
        tracing::error!("Matrix has to be square, got {} x {}", a.nrows(), a.ncols());
        return Err(Exit::NotSquare);
    }
    if rhs.nrows() != a.nrows() {
        tracing::error!(
            "Size of right hand side ({}) does not match the matrix ({})",
            rhs.nrows(),
            a.nrows()
        );
        return Err(Exit::RhsLength);
    }
    if rhs.ncols() != 1 {
        tracing::error!("Right hand side has to have just a single column, got {}", rhs.ncols());
        return Err(Exit::RhsColumns);
    }
    Ok((a, rhs.into_vec()))
}

/// Everything one participant does. Every rank returns the same exit code.
fn participant_main(comm: &UniverseComm, args: &Args, opts: &SolverOptions) -> Exit {
    let start = Instant::now();

    // Status header [exit code, N], so a failed load stops every rank.
    let mut header = vec![0.0; 2];
    let mut system = None;
    if comm.rank() == ROOT {
        match load_system(args) {
            Ok((a, b)) => {
                header[1] = a.nrows() as f64;
                system = Some((a, b));
            }
            Err(code) => header[0] = code as u8 as f64,
        }
    }
    comm.broadcast(&mut header, ROOT);
    let status = Exit::from_code(header[0] as u8);
    if status != Exit::Success {
        return status;
    }
    let n = header[1] as usize;

    let (mut a_data, mut b) = match system {
        Some((a, b)) => (a.into_vec(), b),
        None => (Vec::new(), Vec::new()),
    };
    comm.broadcast(&mut a_data, ROOT);
    comm.broadcast(&mut b, ROOT);
    let a = match DenseMatrix::from_row_major(n, n, a_data) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(rank = comm.rank(), "Broadcast matrix is inconsistent: {e}");
            return Exit::Setup;
        }
    };

    let pool = match KernelPool::new(opts.threads) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(rank = comm.rank(), "{e}");
            return Exit::Setup;
        }
    };
    let mut solver = CgSolver::from_options(ParticipantContext::new(comm, &pool), opts);
    let mut x = vec![0.0; n];
    if let Err(e) = solver.solve_slice(&a, &b, &mut x) {
        if comm.rank() == ROOT {
            tracing::error!("Solver setup failed: {e}");
        }
        return Exit::Setup;
    }

    if comm.rank() != ROOT {
        return Exit::Success;
    }
    tracing::info!("Total time = {:.6} s", start.elapsed().as_secs_f64());
    tracing::debug!("True relative residual = {:e}", true_relative_residual(&a, &x, &b));

    tracing::info!("Writing solution to {} ...", args.sol_file.display());
    if let Err(e) = write_vector_file(&args.sol_file, &x) {
        tracing::error!("Failed to save solution: {e}");
        return Exit::SolutionWrite;
    }
    tracing::info!("Finished successfully");
    Exit::Success
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let mut opts = match SolverOptions::default().with_env_overrides() {
        Ok(opts) => opts,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(Exit::Setup as u8);
        }
    };
    if let Some(max_iters) = args.max_iters {
        opts = opts.with_max_iters(max_iters);
    }
    if let Some(rel_tol) = args.rel_tol {
        opts = opts.with_rel_tol(rel_tol);
    }
    if let Some(threads) = args.threads {
        opts = opts.with_threads(threads);
    }

    #[cfg(feature = "mpi")]
    if args.mpi {
        let comm = match parcg::parallel::MpiComm::new() {
            Ok(comm) => UniverseComm::Mpi(comm),
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::from(Exit::Setup as u8);
            }
        };
        if comm.rank() == ROOT {
            log_parameters(&args, &opts, comm.size());
        }
        return ExitCode::from(participant_main(&comm, &args, &opts) as u8);
    }

    log_parameters(&args, &opts, args.participants.max(1));
    let codes = run_participants(args.participants, |comm| {
        participant_main(&UniverseComm::Local(comm), &args, &opts)
    });
    let code = codes.first().copied().unwrap_or(Exit::Setup);
    ExitCode::from(code as u8)
}

fn log_parameters(args: &Args, opts: &SolverOptions, participants: usize) {
    tracing::info!("Command line arguments:");
    tracing::info!("  input_file_matrix: {}", args.matrix_file.display());
    tracing::info!("  input_file_rhs:    {}", args.rhs_file.display());
    tracing::info!("  output_file_sol:   {}", args.sol_file.display());
    tracing::info!("  max_iters:         {}", opts.max_iters);
    tracing::info!("  rel_tol:           {:e}", opts.rel_tol);
    tracing::info!("  participants:      {participants}");
    tracing::info!("  threads/participant: {}", opts.threads);
}
