#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

use std::fmt::Write as _;
use std::io::{BufRead, Write as _};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use crm_api_client::{CrmApiClient, CrmApiClientConfig};
use crm_app_state::customer_list::NO_ACTIONS_AVAILABLE;
use crm_app_state::navigation::{HOME_BODY, HOME_CALL_TO_ACTION, HOME_TITLE};
use crm_app_state::{
    Confirm, CrmError, CustomerFormController, CustomerListController, CustomerListState,
    DeleteOutcome, FilterField, FormField, FormMode, LoginForm, NavigationBar, NavigationSignal,
    ProfileView, Route, RowActions,
};
use crm_client_core::{
    FileSessionStore, Session, SessionContext, normalize_base_url, resolve_api_base_url,
    resolve_session_path,
};

#[derive(Parser, Debug)]
#[command(name = "crm")]
#[command(about = "Terminal front-end for the CRM API")]
pub struct CrmCli {
    /// API base URL. Overrides CRM_API_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Session file. Overrides CRM_SESSION_FILE.
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,
    /// Per-request timeout in milliseconds. No timeout when omitted.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the home page
    Home,
    /// Sign in and store the session
    Login(LoginArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the navigation bar for the current session
    Whoami,
    /// List, add, edit and delete customers
    Customers(CustomersArgs),
    /// Show the signed-in user's profile
    Profile,
    /// Resolve an app path (e.g. /customers/edit/7) and render it
    Open { path: String },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,
    /// Read from stdin when omitted.
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct CustomersArgs {
    #[command(subcommand)]
    pub command: CustomerCommand,
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    List(ListArgs),
    Add(CustomerFieldArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: CustomerFieldArgs,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub registration_date: Option<String>,
    /// Fetch even without a stored session.
    #[arg(long)]
    pub reload: bool,
}

#[derive(Args, Debug, Default)]
pub struct CustomerFieldArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub registration_date: Option<String>,
}

impl CustomerFieldArgs {
    fn entries(&self) -> impl Iterator<Item = (FormField, &str)> {
        [
            (FormField::FirstName, &self.first_name),
            (FormField::LastName, &self.last_name),
            (FormField::Email, &self.email),
            (FormField::Region, &self.region),
            (FormField::RegistrationDate, &self.registration_date),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
    }
}

struct Shell {
    api: CrmApiClient,
    session: SessionContext<FileSessionStore>,
}

impl Shell {
    fn open(cli: &CrmCli) -> Result<Self> {
        let base_url = match cli.base_url.as_deref() {
            Some(raw) => normalize_base_url(raw)?,
            None => {
                let (base_url, source) = resolve_api_base_url()?;
                tracing::debug!(%base_url, source = source.as_str(), "resolved api base url");
                base_url
            }
        };
        let session_path = cli
            .session_file
            .clone()
            .unwrap_or_else(resolve_session_path);

        let mut config = CrmApiClientConfig::new(base_url);
        config.timeout_ms = cli.timeout_ms;
        let api = CrmApiClient::new(config).context("build api client")?;
        let session = SessionContext::open(FileSessionStore::new(&session_path))
            .with_context(|| format!("open session file {}", session_path.display()))?;
        Ok(Self { api, session })
    }
}

/// Prompts on stderr and reads a y/n answer from stdin.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
    }
}

pub async fn run(cli: CrmCli) -> Result<()> {
    let mut shell = Shell::open(&cli)?;
    match cli.command {
        Commands::Home => print!("{}", render_home(&shell.session.snapshot())),
        Commands::Login(args) => login(&mut shell, args).await?,
        Commands::Logout => {
            let route = NavigationBar::logout(&mut shell.session)?;
            print!("{}", render_route(&shell, route).await?);
        }
        Commands::Whoami => print!("{}", render_navbar(&shell.session.snapshot())),
        Commands::Customers(args) => customers(&shell, args.command).await?,
        Commands::Profile => print!("{}", render_profile(&shell).await?),
        Commands::Open { path } => {
            let route = Route::from_path(&path);
            print!("{}", render_route(&shell, route).await?);
        }
    }
    Ok(())
}

async fn login(shell: &mut Shell, args: LoginArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_password()?,
    };
    let mut form = LoginForm::new(args.username, password);
    let route = form.submit(&shell.api, &mut shell.session).await?;
    print!("{}", render_route(shell, route).await?);
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush().context("flush prompt")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn customers(shell: &Shell, command: CustomerCommand) -> Result<()> {
    let session = shell.session.snapshot();
    match command {
        CustomerCommand::List(args) => {
            let mut controller = CustomerListController::new(shell.api.clone());
            let state = controller.state_mut();
            for (field, value) in [
                (FilterField::Name, args.name),
                (FilterField::Email, args.email),
                (FilterField::Region, args.region),
                (FilterField::RegistrationDate, args.registration_date),
            ] {
                if let Some(value) = value {
                    state.set_filter(field, value);
                }
            }
            let signal = NavigationSignal {
                reload: args.reload,
            };
            controller.mount(&session, signal).await;
            print!("{}", render_customer_list(controller.state()));
        }
        CustomerCommand::Add(fields) => {
            submit_form(shell, &session, FormMode::Add, &fields).await?;
        }
        CustomerCommand::Edit { id, fields } => {
            submit_form(shell, &session, FormMode::Edit { id }, &fields).await?;
        }
        CustomerCommand::Delete { id, yes } => {
            let mut controller = CustomerListController::new(shell.api.clone());
            controller.on_session_changed(&session);
            let mut always = |_: &str| true;
            let mut prompt = StdinConfirm;
            let confirm: &mut dyn Confirm = if yes { &mut always } else { &mut prompt };
            match controller.request_delete(&session, id, confirm).await {
                Ok(DeleteOutcome::Deleted) => println!("Deleted customer {id}."),
                Ok(DeleteOutcome::Cancelled) => println!("Delete cancelled."),
                Err(CrmError::Permission(message)) => {
                    eprintln!("{message}");
                    return Err(anyhow!("permission denied"));
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
    Ok(())
}

async fn submit_form(
    shell: &Shell,
    session: &Session,
    mode: FormMode,
    fields: &CustomerFieldArgs,
) -> Result<()> {
    let mut form = CustomerFormController::new(shell.api.clone(), mode);
    form.mount(session).await;
    if let Some(notice) = form.notice() {
        return Err(anyhow!("{notice}"));
    }
    for (field, value) in fields.entries() {
        form.set_field(field, value);
    }
    let route = form.submit(session).await?;
    match mode {
        FormMode::Add => println!("Customer added."),
        FormMode::Edit { id } => println!("Customer {id} updated."),
    }
    print!("{}", render_route(shell, route).await?);
    Ok(())
}

async fn render_profile(shell: &Shell) -> Result<String> {
    let mut view = ProfileView::default();
    view.load(&shell.api, &shell.session.snapshot()).await;
    if let Some(notice) = view.notice() {
        return Err(anyhow!("{notice}"));
    }
    let mut out = String::new();
    for (label, value) in view.rows() {
        let _ = writeln!(out, "{label:<14} {value}");
    }
    Ok(out)
}

async fn render_route(shell: &Shell, route: Route) -> Result<String> {
    let session = shell.session.snapshot();
    match route {
        Route::Home => Ok(render_home(&session)),
        Route::Login => Ok(format!(
            "{}Sign in with `crm login --username <name>`.\n",
            render_navbar(&session)
        )),
        Route::Customers => {
            let mut controller = CustomerListController::new(shell.api.clone());
            controller.mount(&session, NavigationSignal::default()).await;
            Ok(render_customer_list(controller.state()))
        }
        Route::CustomerAdd => Ok(render_form_help(FormMode::Add, None)),
        Route::CustomerEdit { id } => {
            let mut form = CustomerFormController::new(shell.api.clone(), FormMode::Edit { id });
            form.mount(&session).await;
            if let Some(notice) = form.notice() {
                return Err(anyhow!("{notice}"));
            }
            Ok(render_form_help(FormMode::Edit { id }, Some(form.fields())))
        }
        Route::Profile => render_profile(shell).await,
        Route::InvalidCustomerId { raw } => Err(anyhow!("not a customer id: {raw}")),
        Route::NotFound { path } => Err(anyhow!("no page at {path}")),
    }
}

#[must_use]
pub fn render_navbar(session: &Session) -> String {
    let bar = NavigationBar::from_session(session);
    let links: Vec<String> = bar
        .links
        .iter()
        .map(|link| format!("{} ({})", link.label, link.route.to_path()))
        .collect();
    let mut out = format!("{} | {}", bar.brand, links.join(" | "));
    if let Some(greeting) = &bar.greeting {
        let _ = write!(out, " | {greeting}");
    }
    if bar.show_logout {
        out.push_str(" | Logout");
    }
    if bar.show_login {
        out.push_str(" | Login (/login)");
    }
    out.push('\n');
    out
}

#[must_use]
pub fn render_home(session: &Session) -> String {
    format!(
        "{}\n{HOME_TITLE}\n{HOME_BODY}\n{} -> {}\n",
        render_navbar(session),
        HOME_CALL_TO_ACTION.label,
        HOME_CALL_TO_ACTION.route.to_path()
    )
}

#[must_use]
pub fn render_customer_list(state: &CustomerListState) -> String {
    let mut out = String::new();
    if let Some(notice) = state.notice() {
        let _ = writeln!(out, "! {notice}");
    }
    if state.visibility().add_customer {
        let _ = writeln!(out, "[Add Customer] {}", Route::CustomerAdd.to_path());
    }
    let _ = writeln!(
        out,
        "{:<6} {:<14} {:<14} {:<28} {:<10} {:<12} Actions",
        "Id", "First Name", "Last Name", "Email", "Region", "Registered"
    );
    for row in state.rows() {
        let actions = match &row.actions {
            RowActions::EditDelete { edit } => format!("edit {} | delete", edit.to_path()),
            RowActions::Unavailable => NO_ACTIONS_AVAILABLE.to_string(),
        };
        let _ = writeln!(
            out,
            "{:<6} {:<14} {:<14} {:<28} {:<10} {:<12} {actions}",
            row.id, row.first_name, row.last_name, row.email, row.region, row.registration_date
        );
    }
    out
}

fn render_form_help(mode: FormMode, fields: Option<&crm_app_state::CustomerFormFields>) -> String {
    let mut out = format!("{}\n", mode.heading());
    for field in FormField::ALL {
        let value = fields.map(|fields| fields.get(field)).unwrap_or_default();
        let _ = writeln!(out, "  {:<18} {value}", field.label());
    }
    let command = match mode {
        FormMode::Add => "crm customers add".to_string(),
        FormMode::Edit { id } => format!("crm customers edit {id}"),
    };
    let _ = writeln!(out, "[{}] {command} --first-name ...", mode.submit_label());
    out
}
