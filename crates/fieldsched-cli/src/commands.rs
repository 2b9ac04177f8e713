use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use fieldsched_catalog::{CachedCatalog, JsonFileStore, ProfileStore};
use fieldsched_cli::config::Config;
use fieldsched_cli::detect::{collect_inputs, detect_file, parse_mappings};
use fieldsched_cli::session::SessionStore;
use fieldsched_cli::{EXIT_FAILED, EXIT_NO_MATCH, EXIT_OK};
use fieldsched_ingest::read_headers;
use fieldsched_match::SelectionPolicy;
use fieldsched_model::{
    AppointmentType, AuthState, CompanyCode, DurationDefaults, IngestionRequest, ProfileUpsert,
    RouteQuery, Session,
};
use fieldsched_services::{
    AuthClient, PaymentsClient, PaymentsProvider, RestProfileStore, ServiceError, WorkflowClient,
    WorkflowService,
};
use tracing::{info, info_span, warn};

use crate::cli::{
    DetectArgs, HeadersArgs, IngestArgs, LoginArgs, PortalArgs, RouteArgs, UpsertArgs,
};
use crate::summary::{
    print_detections, print_explanation, print_headers, print_profile, print_profiles,
    print_subscription, print_workflow_response,
};

const PASSWORD_ENV: &str = "FIELDSCHED_PASSWORD";

/// Loaded configuration plus the session file, shared by every command.
pub struct App {
    pub config: Config,
    pub sessions: SessionStore,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            sessions: SessionStore::default_location()?,
        })
    }

    fn session(&self) -> Result<Option<Session>> {
        Ok(self.sessions.load()?.session().cloned())
    }

    fn require_session(&self) -> Result<Session> {
        Ok(self.session()?.ok_or(ServiceError::NotSignedIn)?)
    }

    fn remote_store(&self) -> Result<RestProfileStore> {
        let store = RestProfileStore::new(self.config.backend_url()?, self.config.http_settings())?;
        Ok(store.with_session(self.session()?.as_ref()))
    }

    fn profile_store(&self, remote: bool) -> Result<Box<dyn ProfileStore>> {
        if remote {
            return Ok(Box::new(self.remote_store()?));
        }
        let path = self.config.profiles_file()?;
        tracing::debug!(path = %path.display(), "using local profile catalog");
        Ok(Box::new(JsonFileStore::new(path)))
    }

    fn catalog(&self, remote: bool) -> Result<CachedCatalog<Box<dyn ProfileStore>>> {
        Ok(CachedCatalog::new(self.profile_store(remote)?).with_ttl(self.config.catalog_ttl()))
    }

    fn workflow(&self) -> Result<WorkflowClient> {
        let mut client =
            WorkflowClient::new(self.config.http_settings())?.with_session(self.session()?.as_ref());
        if let Some(url) = &self.config.workflow.ingest_url {
            client = client.with_ingest_url(url.clone());
        }
        if let Some(url) = &self.config.workflow.route_url {
            client = client.with_route_url(url.clone());
        }
        Ok(client)
    }
}

pub fn run_detect(app: &App, args: &DetectArgs) -> Result<i32> {
    let files = collect_inputs(&args.files)?;
    let mut matcher = app.config.matcher();
    if let Some(threshold) = args.threshold {
        if !(threshold > 0.0 && threshold <= 1.0) {
            bail!("--threshold must be greater than 0 and at most 1");
        }
        matcher = matcher.with_threshold(threshold);
    }
    if args.best_ratio {
        matcher = matcher.with_policy(SelectionPolicy::BestRatio);
    }

    let mut catalog = app.catalog(args.remote)?;
    if catalog.profiles()?.is_empty() {
        warn!("profile catalog is empty; nothing can match");
    }

    let mut detections = Vec::new();
    let mut failures = Vec::new();
    for file in &files {
        let span = info_span!("detect", file = %file.display());
        let _guard = span.enter();
        let profiles = catalog.profiles()?;
        match detect_file(file, profiles, &matcher, args.explain) {
            Ok(detection) => detections.push(detection),
            Err(error) => {
                warn!("skipping file: {error:#}");
                failures.push((file.display().to_string(), format!("{error:#}")));
            }
        }
    }

    print_detections(&detections, &failures);
    if args.explain {
        for detection in &detections {
            print_explanation(detection);
        }
    }

    if !failures.is_empty() {
        Ok(EXIT_FAILED)
    } else if detections.iter().any(|d| !d.is_match()) {
        Ok(EXIT_NO_MATCH)
    } else {
        Ok(EXIT_OK)
    }
}

pub fn run_headers(args: &HeadersArgs) -> Result<()> {
    let row = read_headers(&args.file)
        .with_context(|| format!("read headers from {}", args.file.display()))?;
    print_headers(&row);
    Ok(())
}

pub fn run_profiles_list(app: &App, remote: bool) -> Result<()> {
    let profiles = app.profile_store(remote)?.list_active()?;
    print_profiles(&profiles);
    Ok(())
}

pub fn run_profiles_upsert(app: &App, args: &UpsertArgs) -> Result<()> {
    let fingerprint = match &args.fingerprint_from {
        Some(path) => read_headers(path)
            .with_context(|| format!("read headers from {}", path.display()))?
            .headers
            .into_iter()
            .filter(|header| !header.is_empty())
            .collect(),
        None => args.fingerprint.clone(),
    };
    if fingerprint.is_empty() {
        warn!("profile has no fingerprint and will never be detected");
    }
    let appointment_type: AppointmentType = args.appointment_type.parse()?;

    let mut request = ProfileUpsert::new(args.code.as_str(), args.name.as_str());
    request.column_fingerprint = fingerprint;
    request.column_mappings = parse_mappings(&args.mappings)?;
    request.durations = DurationDefaults {
        standard_minutes: args.standard_minutes,
        high_value_minutes: args.high_value_minutes,
    };
    request.appointment_type = appointment_type;

    let stored = app.profile_store(args.remote)?.upsert(request)?;
    print_profile(&stored);
    Ok(())
}

pub fn run_ingest(app: &App, args: &IngestArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();

    let company_hint = if let Some(code) = &args.company {
        Some(CompanyCode::new(code.as_str())?)
    } else if args.no_detect {
        None
    } else {
        let profiles = app.profile_store(args.remote)?.list_active()?;
        let detection = detect_file(&args.file, &profiles, &app.config.matcher(), false)?;
        match detection.matched {
            Some(profile) => Some(profile.code),
            None => {
                warn!("no company profile matched; sending without a hint");
                None
            }
        }
    };

    let request = IngestionRequest {
        file_name,
        bytes,
        company_hint,
    };
    let response = app.workflow()?.submit_file(&request)?;
    print_workflow_response(&response);
    Ok(())
}

pub fn run_route(app: &App, args: &RouteArgs) -> Result<()> {
    let query = RouteQuery {
        service_date: args.date,
        start_location: args.start.clone(),
        inspection_ids: args.inspections.clone(),
    };
    let response = app.workflow()?.submit_route_query(&query)?;
    print_workflow_response(&response);
    Ok(())
}

pub fn run_login(app: &App, args: &LoginArgs) -> Result<()> {
    let password = read_password()?;
    let auth = AuthClient::new(app.config.backend_url()?, app.config.http_settings())?;
    let session = auth.sign_in_with_password(args.email.trim(), &password)?;
    app.sessions.save(&session)?;
    println!(
        "Signed in as {}",
        session.email.as_deref().unwrap_or(&session.user_id)
    );
    Ok(())
}

pub fn run_logout(app: &App) -> Result<()> {
    if let AuthState::SignedIn(session) = app.sessions.load()? {
        match app.config.backend_url() {
            Ok(url) => {
                let revoked = AuthClient::new(url, app.config.http_settings())
                    .and_then(|auth| auth.sign_out(&session));
                if let Err(error) = revoked {
                    warn!("could not revoke session on the server: {error}");
                }
            }
            Err(_) => warn!("backend URL not configured; only removing the local session"),
        }
    }
    if app.sessions.clear()? {
        info!("removed stored session");
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn run_subscription_status(app: &App) -> Result<()> {
    let session = app.require_session()?;
    let payments = PaymentsClient::new(app.config.functions_url()?, app.config.http_settings())?;
    let subscription = payments.check_subscription(&session)?;
    print_subscription(&subscription);
    Ok(())
}

pub fn run_subscription_portal(app: &App, args: &PortalArgs) -> Result<()> {
    let session = app.require_session()?;
    let payments = PaymentsClient::new(app.config.functions_url()?, app.config.http_settings())?;
    let portal = payments.open_portal(&session, args.return_url.as_deref())?;
    println!("{}", portal.url);
    Ok(())
}

/// Password from the environment, or one line from stdin.
fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        if !password.is_empty() {
            return Ok(password);
        }
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given (set {PASSWORD_ENV} or type it on stdin)");
    }
    Ok(password)
}
