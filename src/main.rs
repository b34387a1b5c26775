use cartao_client::{ApiClient, CardService, ClientConfig, ClientError, MemoryTokenStore};
use cartao_core::{parse_application_date, CardConfig, Credentials, PersonId, TableOptions, VaccinationId};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Commands:
  login <user> <password>              start a session
  logout                               end the session and drop the card
  persons                              list persons
  select <person-id>                   load a person's card
  category <name>                      show another vaccine category
  show                                 print the current card
  ids                                  toggle record ids in the card
  vaccinate <vaccine>;<slot>[;date]    record a dose (date YYYY-MM-DD, default today)
  delete <record-id>                   delete a recorded dose
  export [dir]                         write the current card as CSV
  help                                 show this text
  quit                                 leave";

/// One line typed at the console prompt.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Login { username: String, password: String },
    Logout,
    Persons,
    Select(PersonId),
    Category(String),
    Show,
    ToggleIds,
    Vaccinate {
        vaccine: String,
        slot: String,
        date: Option<NaiveDate>,
    },
    Delete(VaccinationId),
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "login" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(username), Some(password)) => Self::Login {
                        username: username.to_string(),
                        password: password.to_string(),
                    },
                    _ => return Err("usage: login <user> <password>".into()),
                }
            }
            "logout" => Self::Logout,
            "persons" => Self::Persons,
            "select" => Self::Select(
                rest.parse()
                    .map_err(|_| format!("invalid person id: '{rest}'"))?,
            ),
            "category" if !rest.is_empty() => Self::Category(rest.to_string()),
            "category" => return Err("usage: category <name>".into()),
            "show" => Self::Show,
            "ids" => Self::ToggleIds,
            "vaccinate" => {
                let fields: Vec<&str> = rest.split(';').map(str::trim).collect();
                let (vaccine, slot, date) = match fields.as_slice() {
                    [vaccine, slot] => (*vaccine, *slot, None),
                    [vaccine, slot, date] => (*vaccine, *slot, Some(*date)),
                    _ => return Err("usage: vaccinate <vaccine>;<slot>[;date]".into()),
                };
                if vaccine.is_empty() || slot.is_empty() {
                    return Err("usage: vaccinate <vaccine>;<slot>[;date]".into());
                }
                let date = date
                    .filter(|d| !d.is_empty())
                    .map(|d| parse_application_date(d).map_err(|e| e.to_string()))
                    .transpose()?;
                Self::Vaccinate {
                    vaccine: vaccine.to_string(),
                    slot: slot.to_string(),
                    date,
                }
            }
            "delete" => Self::Delete(
                rest.parse()
                    .map_err(|_| format!("invalid record id: '{rest}'"))?,
            ),
            "export" => Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };

        Ok(Some(command))
    }
}

struct Console {
    service: CardService,
    show_ids: bool,
}

impl Console {
    /// Runs one command. Returns `false` when the console should stop.
    async fn execute(&mut self, command: Command) -> anyhow::Result<bool> {
        let service = &self.service;

        match command {
            Command::Login { username, password } => {
                service
                    .client()
                    .login(&Credentials::new(&username, password)?)
                    .await?;
                println!("Logged in as {username}");
            }
            Command::Logout => {
                service.logout()?;
                println!("Logged out");
            }
            Command::Persons => {
                for person in service.client().list_persons().await? {
                    println!(
                        "{:>5}  {}  ({})",
                        person.id, person.name, person.identification_number
                    );
                }
            }
            Command::Select(person_id) => {
                let view = service.load_view(person_id, None).await?;
                println!(
                    "Selected {} ({}), categories: {}",
                    view.person().name,
                    view.person().identification_number,
                    view.categories().join(", ")
                );
                self.print_view()?;
            }
            Command::Category(category) => {
                service.switch_category(&category)?;
                self.print_view()?;
            }
            Command::Show => self.print_view()?,
            Command::ToggleIds => {
                self.show_ids = !self.show_ids;
                println!("Record ids {}", if self.show_ids { "on" } else { "off" });
                if service.current_view().is_ok() {
                    self.print_view()?;
                }
            }
            Command::Vaccinate {
                vaccine,
                slot,
                date,
            } => {
                let applied_on = date.unwrap_or_else(|| chrono::Local::now().date_naive());
                service.register_dose(&vaccine, &slot, applied_on).await?;
                println!(
                    "Recorded {slot} of {vaccine} on {}",
                    service.config().format_date(applied_on)
                );
                self.print_view()?;
            }
            Command::Delete(record_id) => {
                service.delete_dose(record_id).await?;
                println!("Deleted record {record_id}");
                self.print_view()?;
            }
            Command::Export(dir) => {
                let view = service.current_view()?;
                let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                let path = service.export_csv_to(&view, &dir)?;
                println!("Exported card to {}", path.display());
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    fn print_view(&self) -> anyhow::Result<()> {
        let view = self.service.current_view()?;
        println!("{} · {}", view.person().name, view.category());
        print!(
            "{}",
            self.service.screen_table(
                &view,
                TableOptions {
                    show_record_ids: self.show_ids,
                }
            )
        );
        Ok(())
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("Error: {err}");
    if let Some(client_err) = err.downcast_ref::<ClientError>() {
        for message in client_err.field_messages() {
            eprintln!("  {message}");
        }
        if client_err.requires_login() {
            eprintln!("Use 'login <user> <password>' to start a new session.");
        }
    }
}

/// Interactive console for the vaccination card.
///
/// Reads one command per line from stdin and keeps the selected person's card
/// in memory between commands. Failures are printed and the loop continues.
///
/// # Environment Variables
/// - `CARTAO_API_URL`: backend base URL (default: "http://127.0.0.1:5000")
/// - `CARTAO_CATEGORY`: category shown after `select` (default: "Nacional")
/// - `CARTAO_DATE_FORMAT`: date pattern for cells and CSV (default: "%d/%m/%Y")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("cartao=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client_config = ClientConfig::from_env_values(
        std::env::var("CARTAO_API_URL").ok(),
        None,
        std::env::var("HOME").ok(),
    )?;
    let card_config = CardConfig::from_env_values(
        std::env::var("CARTAO_CATEGORY").ok(),
        std::env::var("CARTAO_DATE_FORMAT").ok(),
    )?;

    tracing::info!("++ Using backend at {}", client_config.base_url());

    let client = ApiClient::new(&client_config, Arc::new(MemoryTokenStore::new()))?;
    let mut console = Console {
        service: CardService::new(client, card_config),
        show_ids: false,
    };

    println!("Cartão de vacinação. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match console.execute(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => report(&err),
        }
    }

    Ok(())
}
