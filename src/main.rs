use clap::{ArgGroup, Parser, Subcommand};
use sgx_deploy::evidence::{self, Evidence, Fingerprint, PccsClient, Quote, RatlsCollector};
use sgx_deploy::instance::{HttpsEndpoint, Orchestrator, SpawnOptions, EVIDENCE_FILE_NAME};
use sgx_deploy::launch::{ApplicationArguments, Identity, Isolation};
use sgx_deploy::logging;
use sgx_deploy::package::{self, AppConfig, CodePackage, APP_CONFIG_NAME, TEST_DIR_NAME};
use sgx_deploy::poll::{ClockTick, SystemClock};
use sgx_deploy::runtime::{DockerRuntime, IContainerRuntime};
use sgx_deploy::secrets::{self, SecretsMaterial};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

const LOCALHOST: &str = "localhost";
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

type DockerOrchestrator = Orchestrator<DockerRuntime, HttpsEndpoint, SystemClock>;

#[derive(Parser)]
#[command(author, version, about = "Deploy applications into SGX enclaves")]
struct Cli {
    /// Log every poll tick and every docker command
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Package(PackageArgs),
    Spawn(SpawnArgs),
    Run(RunArgs),
    Evidence(EvidenceArgs),
    Verify(VerifyArgs),
    Seal(SealArgs),
    Fingerprint(FingerprintArgs),
    Status(NameArgs),
    Logs(LogsArgs),
    Stop(StopArgs),
    Restart(NameArgs),
    List,
    Test(TestArgs),
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Bundle a code directory, its docker image and its configuration \
    into an application package")]
struct PackageArgs {
    /// Directory holding the application code
    #[arg(long)]
    code: PathBuf,

    #[arg(long, default_value = "Dockerfile")]
    dockerfile: PathBuf,

    #[arg(long, default_value = APP_CONFIG_NAME)]
    config: PathBuf,

    /// Directory holding the application test suite
    #[arg(long)]
    test: Option<PathBuf>,

    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Start an application package as a named instance and wait until \
    it asks for its secrets")]
struct SpawnArgs {
    name: String,

    #[arg(short, long)]
    package: PathBuf,

    /// Host name the instance certificate is issued for
    #[arg(long, default_value = LOCALHOST)]
    host: String,

    #[arg(long)]
    port: u16,

    /// Enclave size in megabytes, a power of two
    #[arg(long, default_value_t = 4096)]
    size: u64,

    /// Validity of the self-signed RA-TLS certificate
    #[arg(long, default_value_t = 365, conflicts_with = "certificate")]
    days: i64,

    /// Operator-supplied certificate, instead of a self-signed one
    #[arg(long)]
    certificate: Option<PathBuf>,

    /// Key the enclave is signed with
    #[arg(long, env = "SGX_DEPLOY_SIGNER_KEY", required_unless_present = "no_sgx")]
    signer_key: Option<PathBuf>,

    /// Run in a plain container, for development only
    #[arg(long)]
    no_sgx: bool,

    /// Provisioning certification caching service to fetch collaterals from
    #[arg(long, env = "SGX_DEPLOY_PCCS")]
    pccs: Option<String>,

    /// The instance workspace is created under this directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Seconds to wait for the instance to ask for its secrets
    #[arg(long, default_value_t = 86400)]
    timeout: u64,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Send the secrets to an instance and wait until the application serves")]
struct RunArgs {
    name: String,

    /// JSON document of application secrets
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Secrets sealed for the enclave
    #[arg(long)]
    sealed_secrets: Option<PathBuf>,

    /// Hex key decrypting the code archive
    #[arg(long)]
    key: Option<String>,

    /// Seconds to wait for the application to start
    #[arg(long, default_value_t = 180)]
    timeout: u64,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Collect the attestation evidence of a running enclave instance")]
struct EvidenceArgs {
    name: String,

    #[arg(long, env = "SGX_DEPLOY_PCCS")]
    pccs: Option<String>,

    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Verify the supplied evidence against an expected fingerprint, or \
    against the fingerprint recomputed from an application package")]
#[command(group(ArgGroup::new("reference").required(true).args(["fingerprint", "package"])))]
struct VerifyArgs {
    #[arg(short, long, default_value = EVIDENCE_FILE_NAME)]
    evidence: PathBuf,

    #[arg(short, long)]
    fingerprint: Option<String>,

    #[arg(short, long)]
    package: Option<PathBuf>,

    /// Where the verified certificate is written
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Verify the supplied evidence, then seal a secrets file for that enclave only")]
#[command(group(ArgGroup::new("reference").required(true).args(["fingerprint", "package"])))]
struct SealArgs {
    /// File to seal
    #[arg(short, long)]
    secrets: PathBuf,

    #[arg(short, long, default_value = EVIDENCE_FILE_NAME)]
    evidence: PathBuf,

    #[arg(short, long)]
    fingerprint: Option<String>,

    #[arg(short, long)]
    package: Option<PathBuf>,

    /// Where the sealed file is written
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Compute the enclave fingerprint of a package for the given launch arguments")]
struct FingerprintArgs {
    #[arg(short, long)]
    package: PathBuf,

    #[arg(short, long, default_value = "args.toml")]
    args: PathBuf,
}

#[derive(Debug, clap::Args)]
struct NameArgs {
    name: String,
}

#[derive(Debug, clap::Args)]
struct LogsArgs {
    name: String,

    #[arg(short, long)]
    follow: bool,
}

#[derive(Debug, clap::Args)]
struct StopArgs {
    name: String,

    /// Also remove the container
    #[arg(long)]
    remove: bool,
}

#[derive(Debug, clap::Args)]
#[command(long_about = None,
    about = "Run the package test suite against a serving instance")]
struct TestArgs {
    name: String,

    /// Directory the instance was spawned under
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let r = match cli.command {
        Command::Package(args) => package(&args),
        Command::Spawn(args) => spawn(&args),
        Command::Run(args) => run(&args),
        Command::Evidence(args) => collect(&args),
        Command::Verify(args) => verify(&args),
        Command::Seal(args) => seal(&args),
        Command::Fingerprint(args) => fingerprint(&args),
        Command::Status(args) => status(&args.name),
        Command::Logs(args) => logs(&args),
        Command::Stop(args) => stop(&args),
        Command::Restart(args) => restart(&args.name),
        Command::List => list(),
        Command::Test(args) => test(&args),
    };

    if let Err(e) = r {
        error!("{e}");
        std::process::exit(1);
    }
}

fn orchestrator() -> Result<DockerOrchestrator, Box<dyn Error>> {
    Ok(Orchestrator::new(
        DockerRuntime::default(),
        HttpsEndpoint::new(LOCALHOST, PROBE_TIMEOUT)?,
        SystemClock,
    ))
}

fn collector(pccs: Option<&str>) -> Result<RatlsCollector, Box<dyn Error>> {
    let pccs = pccs.map(PccsClient::new).transpose()?;
    Ok(RatlsCollector::new(LOCALHOST, pccs))
}

fn absolute(p: &Path) -> Result<PathBuf, Box<dyn Error>> {
    fs::canonicalize(p).map_err(|e| format!("{}: {e}", p.display()).into())
}

fn package(args: &PackageArgs) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load(&args.config)?;
    let workdir = tempfile::tempdir()?;

    let code_tar = workdir.path().join(package::CODE_TAR_NAME);
    info!("Archiving {}...", args.code.display());
    package::archive_code(&args.code, &code_tar)?;

    let docker = DockerRuntime::default();
    let tag = format!("{}:latest", config.name.to_lowercase());
    let context = args
        .dockerfile
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    info!("Building the docker image {tag}...");
    docker.build_image(context, &args.dockerfile, &tag)?;

    let image_tar = workdir.path().join(package::IMAGE_TAR_NAME);
    info!("Saving the docker image...");
    docker.save_image(&tag, &image_tar)?;

    fs::create_dir_all(&args.output)?;
    let output = args.output.join(format!("package_{}.tar", config.name));

    CodePackage {
        code_tar,
        image_tar,
        config_path: args.config.clone(),
        test_dir: args.test.clone(),
    }
    .create(&output)?;

    info!("Package written to {}", output.display());
    Ok(())
}

fn spawn(args: &SpawnArgs) -> Result<(), Box<dyn Error>> {
    let identity = match &args.certificate {
        Some(path) => Identity::Certificate {
            path: absolute(path)?,
        },
        None => {
            let validity = chrono::Duration::try_days(args.days)
                .ok_or_else(|| format!("{} days is out of range", args.days))?;
            let expiration = chrono::Utc::now()
                .checked_add_signed(validity)
                .ok_or_else(|| format!("{} days is out of range", args.days))?;
            Identity::SelfSigned {
                expiration: expiration.timestamp(),
            }
        }
    };

    let isolation = match (&args.signer_key, args.no_sgx) {
        (_, true) => Isolation::Plain,
        (Some(key), false) => Isolation::Sgx {
            signer_key: absolute(key)?,
        },
        (None, false) => return Err("a signer key is required to run in an enclave".into()),
    };

    fs::create_dir_all(&args.output)?;
    let workspace = absolute(&args.output)?.join(&args.name);

    let options = SpawnOptions {
        host: args.host.clone(),
        port: args.port,
        size: args.size,
        identity,
        isolation,
    };

    let tick = ClockTick::new(
        Duration::from_secs(args.timeout),
        format!("{} never asked for its secrets", args.name),
    );

    let d = orchestrator()?.spawn(
        &args.name,
        &args.package,
        &workspace,
        options,
        &tick,
        &collector(args.pccs.as_deref())?,
    )?;

    println!("app_id: {}", d.config.app_id);
    println!("arguments: {}", d.args_path.display());
    if let Some(p) = &d.evidence_path {
        println!("evidence: {}", p.display());
    }
    info!("Verify the evidence, then send the secrets with `run {}`", args.name);
    Ok(())
}

fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let material = SecretsMaterial::load(
        args.secrets.as_deref(),
        args.sealed_secrets.as_deref(),
        args.key.as_deref(),
    )?;

    let tick = ClockTick::new(
        Duration::from_secs(args.timeout),
        format!("{} never started serving", args.name),
    );

    secrets::provision(&orchestrator()?, &args.name, &material, &tick)?;
    Ok(())
}

fn collect(args: &EvidenceArgs) -> Result<(), Box<dyn Error>> {
    let e = orchestrator()?.collect_evidence(&args.name, &collector(args.pccs.as_deref())?)?;

    fs::create_dir_all(&args.output)?;
    let p = args.output.join(EVIDENCE_FILE_NAME);
    e.save(&p)?;

    info!("Evidence written to {}", p.display());
    Ok(())
}

/// Verify the evidence at `path` against `fingerprint`, or against the
/// fingerprint recomputed from `package`.
fn appraise(
    path: &Path,
    e: &Evidence,
    fingerprint: Option<&str>,
    package: Option<&Path>,
) -> Result<Quote, Box<dyn Error>> {
    let expected: Fingerprint = match (fingerprint, package) {
        (Some(f), _) => f.parse()?,
        (None, Some(package)) => {
            let workdir = tempfile::tempdir()?;
            let cert_dir = path.parent().unwrap_or(Path::new("."));
            let input = e.input_args.clone().with_certificate_dir(cert_dir);
            evidence::fingerprint_of_package(
                &DockerRuntime::default(),
                package,
                &input,
                workdir.path(),
            )?
        }
        (None, None) => return Err("either a fingerprint or a package is required".into()),
    };

    Ok(evidence::verify(e, &expected)?)
}

fn verify(args: &VerifyArgs) -> Result<(), Box<dyn Error>> {
    let e = Evidence::load(&args.evidence)?;
    let quote = appraise(
        &args.evidence,
        &e,
        args.fingerprint.as_deref(),
        args.package.as_deref(),
    )?;

    fs::create_dir_all(&args.output)?;
    let p = args.output.join("ratls.pem");
    fs::write(&p, e.certificate()?.to_pem()?)?;

    println!("mr_enclave: {}", hex::encode(quote.mr_enclave));
    println!("mr_signer: {}", hex::encode(quote.mr_signer));
    info!("Verification successful, certificate written to {}", p.display());
    Ok(())
}

fn seal(args: &SealArgs) -> Result<(), Box<dyn Error>> {
    let e = Evidence::load(&args.evidence)?;
    let quote = appraise(
        &args.evidence,
        &e,
        args.fingerprint.as_deref(),
        args.package.as_deref(),
    )?;

    fs::create_dir_all(&args.output)?;
    let p = secrets::seal_file(&args.secrets, &quote, &args.output)?;

    println!("{}", p.display());
    info!("Send it with `run --sealed-secrets {}`", p.display());
    Ok(())
}

fn fingerprint(args: &FingerprintArgs) -> Result<(), Box<dyn Error>> {
    let cert_dir = args.args.parent().unwrap_or(Path::new("."));
    let input = ApplicationArguments::load(&args.args)?.with_certificate_dir(cert_dir);
    let workdir = tempfile::tempdir()?;

    let f = evidence::fingerprint_of_package(
        &DockerRuntime::default(),
        &args.package,
        &input,
        workdir.path(),
    )?;

    println!("{f}");
    Ok(())
}

fn status(name: &str) -> Result<(), Box<dyn Error>> {
    let s = orchestrator()?.status(name)?;

    println!("name: {}", s.name);
    println!("state: {}", s.state);
    println!("container: {}", s.container);
    println!("image: {}", s.image);
    println!("started at: {}", s.started_at);
    println!("app_id: {}", s.config.app_id);
    println!("host: {}", s.config.host);
    println!("port: {}", s.config.port);
    println!("enclave: {}", s.config.is_sgx());
    Ok(())
}

fn logs(args: &LogsArgs) -> Result<(), Box<dyn Error>> {
    let o = orchestrator()?;

    if args.follow {
        o.follow_logs(&args.name)?;
    } else {
        print!("{}", o.logs(&args.name)?);
    }
    Ok(())
}

fn stop(args: &StopArgs) -> Result<(), Box<dyn Error>> {
    orchestrator()?.stop(&args.name, args.remove)?;
    Ok(())
}

fn restart(name: &str) -> Result<(), Box<dyn Error>> {
    orchestrator()?.restart(name)?;
    Ok(())
}

fn list() -> Result<(), Box<dyn Error>> {
    for s in orchestrator()?.list()? {
        println!(
            "{}\t{}\tport {}\t{}\t{}",
            s.name, s.state, s.config.port, s.config.app_id, s.started_at
        );
    }
    Ok(())
}

fn test(args: &TestArgs) -> Result<(), Box<dyn Error>> {
    let workspace = args.output.join(&args.name);
    let app_config = AppConfig::load(&workspace.join(APP_CONFIG_NAME))?;
    let test_dir = workspace.join(TEST_DIR_NAME);

    if !test_dir.is_dir() {
        return Err(format!("{} has no test directory", workspace.display()).into());
    }

    orchestrator()?.test(&args.name, &app_config, &test_dir)?;
    info!("Tests successful");
    Ok(())
}
