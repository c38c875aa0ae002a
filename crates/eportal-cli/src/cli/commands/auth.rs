//! Account command handlers.
//!
//! The terminal is a rendering layer over the form controllers: commands feed
//! edits and a submit into a `FormRuntime`, wait for it to settle, then print
//! field errors, banners and notifications.

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use eportal_core::api::{AuthBackend, AuthError, HttpBackend};
use eportal_core::config::{Config, paths};
use eportal_core::credentials::{CredentialStore, FileCredentialStore, mask_token};
use eportal_core::notifications::NotificationPresenter;
use eportal_core::session::SessionStore;
use eportal_types::NotificationKind;
use eportal_ui::events::UiEvent;
use eportal_ui::forms::{Field, FormKind, FormPhase};
use eportal_ui::{FormRuntime, Route, Services};

fn services(config: &Config) -> Result<Services> {
    let backend: Arc<dyn AuthBackend> =
        Arc::new(HttpBackend::from_config(&config.api).context("create backend client")?);
    let credentials = Arc::new(FileCredentialStore::default_location());
    let session = Arc::new(SessionStore::new(Arc::clone(&backend), credentials));
    Ok(Services {
        session,
        backend,
        notifications: NotificationPresenter::from_config(&config.notifications),
    })
}

fn edit(runtime: &mut FormRuntime, form: FormKind, field: Field, value: String) {
    runtime.dispatch(UiEvent::Edit { form, field, value });
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::NationalId => "national ID",
        Field::Password => "password",
        Field::CurrentPassword => "current password",
        Field::Name => "name",
        Field::PasswordConfirmation => "password confirmation",
    }
}

/// Reads one line from stdin, prompting on stderr when interactive.
fn read_secret(prompt: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("{prompt}");
        io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints the settled outcome of `kind`; any outcome but success is an error.
fn report(runtime: &FormRuntime, kind: FormKind) -> Result<()> {
    let status = runtime.state.status(kind);
    match status.phase {
        FormPhase::Success => {
            if let Some(notification) = runtime.services().notifications.current()
                && notification.kind == NotificationKind::Success
            {
                println!("✓ {}", notification.message);
            }
            Ok(())
        }
        FormPhase::Failed => {
            let message = status
                .banner
                .as_ref()
                .map_or("Request failed.", |banner| banner.message.as_str());
            bail!("{message}")
        }
        FormPhase::Validating => {
            for (field, err) in status.errors.iter() {
                eprintln!("  {}: {err}", field_label(field));
            }
            bail!("Please correct the fields above.")
        }
        FormPhase::Idle | FormPhase::Submitting => {
            bail!("{} did not complete", kind.label())
        }
    }
}

pub async fn login(config: &Config, national_id: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_secret("Password: ")?,
    };

    let mut runtime = FormRuntime::new(services(config)?);
    if let Some(user) = runtime.state.session.user() {
        println!("Replacing the saved session of {}", user.display_name());
    }

    edit(&mut runtime, FormKind::Login, Field::NationalId, national_id);
    edit(&mut runtime, FormKind::Login, Field::Password, password);
    runtime.dispatch(UiEvent::Submit(FormKind::Login));
    runtime.settle().await;
    report(&runtime, FormKind::Login)?;

    let session = runtime.services().session.get_session();
    let Some(user) = session.user() else {
        bail!("Login finished without a session");
    };
    println!("✓ Logged in as {}", user.display_name());
    println!("  Permissions: {}", session.permissions().len());
    println!("  Session saved to: {}", paths::credentials_path().display());
    Ok(())
}

/// Works on the credential file alone so a broken backend setting never
/// leaves a session behind.
pub fn logout() -> Result<()> {
    let store = FileCredentialStore::default_location();
    let had_session = matches!(store.load(), Ok(Some(_)));
    store.clear().context("remove saved session")?;

    if had_session {
        println!("✓ Logged out");
        println!("  Session removed from: {}", store.path().display());
    } else {
        println!("Not logged in (no saved session).");
    }
    Ok(())
}

pub async fn whoami(config: &Config, refresh: bool) -> Result<()> {
    let services = services(config)?;
    let mut session = services.session.get_session();

    if refresh && session.is_authenticated() {
        session = match services.session.refresh_current_user().await {
            Ok(session) => session,
            Err(AuthError::InvalidCredentials) => {
                bail!("Session expired. Please log in again.")
            }
            Err(err) => bail!("{}", err.user_message()),
        };
    }

    let Some(auth) = session.auth() else {
        println!("Not logged in.");
        return Ok(());
    };

    println!("National ID: {}", auth.user.national_id);
    if let Some(name) = &auth.user.name {
        println!("Name: {name}");
    }
    if let Some(status) = &auth.user.status {
        println!("Status: {status}");
    }
    println!("Token: {}", mask_token(&auth.token));
    if auth.permissions.is_empty() {
        println!("Permissions: none");
    } else {
        println!("Permissions:");
        for capability in auth.permissions.iter() {
            println!("  {capability}");
        }
    }
    Ok(())
}

pub async fn forgot_password(config: &Config, national_id: String) -> Result<()> {
    let mut runtime = FormRuntime::new(services(config)?);
    runtime.dispatch(UiEvent::Navigate(Route::ForgotPassword));

    edit(
        &mut runtime,
        FormKind::ForgotPassword,
        Field::NationalId,
        national_id,
    );
    runtime.dispatch(UiEvent::Submit(FormKind::ForgotPassword));
    runtime.settle().await;
    report(&runtime, FormKind::ForgotPassword)
}

pub async fn register(
    config: &Config,
    national_id: String,
    name: String,
    password: Option<String>,
) -> Result<()> {
    let (password, confirmation) = match password {
        Some(password) => (password.clone(), password),
        None if io::stdin().is_terminal() => {
            let password = read_secret("Password: ")?;
            let confirmation = read_secret("Confirm password: ")?;
            (password, confirmation)
        }
        None => {
            let password = read_secret("Password: ")?;
            (password.clone(), password)
        }
    };

    let mut runtime = FormRuntime::new(services(config)?);
    runtime.dispatch(UiEvent::Navigate(Route::Register));

    edit(
        &mut runtime,
        FormKind::Register,
        Field::NationalId,
        national_id.clone(),
    );
    edit(&mut runtime, FormKind::Register, Field::Name, name);
    edit(&mut runtime, FormKind::Register, Field::Password, password);
    edit(
        &mut runtime,
        FormKind::Register,
        Field::PasswordConfirmation,
        confirmation,
    );
    runtime.dispatch(UiEvent::Submit(FormKind::Register));
    runtime.settle().await;
    report(&runtime, FormKind::Register)?;

    println!("  Log in with: eportal login --national-id {national_id}");
    Ok(())
}

pub async fn profile(
    config: &Config,
    name: Option<String>,
    new_password: Option<String>,
    current_password: Option<String>,
) -> Result<()> {
    let mut runtime = FormRuntime::new(services(config)?);
    if !runtime.state.session.is_authenticated() {
        bail!("Not logged in. Run `eportal login` first.");
    }
    runtime.dispatch(UiEvent::Navigate(Route::Settings));

    if let Some(name) = name {
        edit(&mut runtime, FormKind::Profile, Field::Name, name);
    }
    if let Some(new_password) = new_password {
        let current = match current_password {
            Some(current) => current,
            None => read_secret("Current password: ")?,
        };
        edit(&mut runtime, FormKind::Profile, Field::CurrentPassword, current);
        edit(
            &mut runtime,
            FormKind::Profile,
            Field::Password,
            new_password.clone(),
        );
        edit(
            &mut runtime,
            FormKind::Profile,
            Field::PasswordConfirmation,
            new_password,
        );
    }
    runtime.dispatch(UiEvent::Submit(FormKind::Profile));
    runtime.settle().await;
    report(&runtime, FormKind::Profile)?;

    if let Some(user) = runtime.services().session.get_session().user() {
        println!("  Name: {}", user.display_name());
    }
    Ok(())
}
