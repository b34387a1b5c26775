use anyhow::Context;
use cartao_client::{ApiClient, CardService, ClientConfig, ClientError, FileTokenStore};
use cartao_core::{
    parse_application_date, CardConfig, Credentials, DoseSlot, NewPerson, NewVaccine, PersonId,
    TableOptions, VaccinationId, VaccineId, DEFAULT_CATEGORY,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cartao")]
#[command(about = "Vaccination card client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the access token for later commands
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "CARTAO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an operator account and log in
    Register {
        username: String,
        #[arg(long, env = "CARTAO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Manage persons
    Persons {
        #[command(subcommand)]
        action: PersonsCommand,
    },
    /// Manage the vaccine catalog
    Vaccines {
        #[command(subcommand)]
        action: VaccinesCommand,
    },
    /// Show or export a vaccination card
    Card {
        #[command(subcommand)]
        action: CardCommand,
    },
    /// Record a dose, after checking the dose sequence locally
    Vaccinate {
        person_id: PersonId,
        /// Vaccine name as listed in the catalog
        vaccine: String,
        /// Dose slot label, e.g. "1a Dose" (see `cartao slots`)
        slot: String,
        /// Application date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a recorded dose by its record id
    Unvaccinate { record_id: VaccinationId },
    /// List the dose slots in card order
    Slots,
}

#[derive(Subcommand)]
enum PersonsCommand {
    List,
    Add {
        name: String,
        /// CPF, RG or another unique document number
        identification: String,
    },
    /// Delete a person and their whole card
    Delete { id: PersonId },
}

#[derive(Subcommand)]
enum VaccinesCommand {
    List {
        #[arg(long)]
        category: Option<String>,
    },
    Add {
        name: String,
        #[arg(long, default_value = DEFAULT_CATEGORY)]
        category: String,
    },
    /// Delete a vaccine and every dose recorded for it
    Delete { id: VaccineId },
}

#[derive(Subcommand)]
enum CardCommand {
    Show {
        person_id: PersonId,
        #[arg(long)]
        category: Option<String>,
        /// Show record ids next to populated cells
        #[arg(long)]
        ids: bool,
    },
    Export {
        person_id: PersonId,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn read_password(given: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn build_service() -> anyhow::Result<CardService> {
    let client_config = ClientConfig::from_env_values(
        std::env::var("CARTAO_API_URL").ok(),
        std::env::var("CARTAO_TOKEN_FILE").ok(),
        std::env::var("HOME").ok(),
    )?;
    let card_config = CardConfig::from_env_values(
        std::env::var("CARTAO_CATEGORY").ok(),
        std::env::var("CARTAO_DATE_FORMAT").ok(),
    )?;

    tracing::info!(
        "++ Using backend at {} (token file {})",
        client_config.base_url(),
        client_config.token_file().display()
    );

    let tokens = Arc::new(FileTokenStore::new(client_config.token_file()));
    let client = ApiClient::new(&client_config, tokens)?;
    Ok(CardService::new(client, card_config))
}

async fn run(command: Commands, service: &CardService) -> anyhow::Result<()> {
    let client = service.client();

    match command {
        Commands::Login { username, password } => {
            let password = read_password(password)?;
            client.login(&Credentials::new(&username, password)?).await?;
            println!("Logged in as {username}");
        }
        Commands::Register { username, password } => {
            let password = read_password(password)?;
            client
                .register(&Credentials::new(&username, password)?)
                .await?;
            println!("Registered and logged in as {username}");
        }
        Commands::Logout => {
            service.logout()?;
            println!("Logged out");
        }
        Commands::Persons { action } => match action {
            PersonsCommand::List => {
                let persons = client.list_persons().await?;
                if persons.is_empty() {
                    println!("No persons found.");
                }
                for person in persons {
                    println!(
                        "ID: {}, Name: {}, Identification: {}",
                        person.id, person.name, person.identification_number
                    );
                }
            }
            PersonsCommand::Add {
                name,
                identification,
            } => {
                let person = client
                    .create_person(&NewPerson::new(&name, &identification)?)
                    .await?;
                println!("Created person {} with ID: {}", person.name, person.id);
            }
            PersonsCommand::Delete { id } => {
                let message = client.delete_person(id).await?;
                println!("{}", message.unwrap_or_else(|| format!("Deleted person {id}")));
            }
        },
        Commands::Vaccines { action } => match action {
            VaccinesCommand::List { category } => {
                let vaccines = client.list_vaccines().await?;
                for vaccine in vaccines
                    .iter()
                    .filter(|v| category.as_deref().map_or(true, |c| v.category == c))
                {
                    println!(
                        "ID: {}, Name: {}, Category: {}",
                        vaccine.id, vaccine.name, vaccine.category
                    );
                }
            }
            VaccinesCommand::Add { name, category } => {
                let vaccine = client
                    .create_vaccine(&NewVaccine::new(&name, &category)?)
                    .await?;
                println!("Created vaccine {} with ID: {}", vaccine.name, vaccine.id);
            }
            VaccinesCommand::Delete { id } => {
                let message = client.delete_vaccine(id).await?;
                println!("{}", message.unwrap_or_else(|| format!("Deleted vaccine {id}")));
            }
        },
        Commands::Card { action } => match action {
            CardCommand::Show {
                person_id,
                category,
                ids,
            } => {
                let view = service.load_view(person_id, category.as_deref()).await?;
                println!(
                    "{} ({}), category {}",
                    view.person().name,
                    view.person().identification_number,
                    view.category()
                );
                print!(
                    "{}",
                    service.screen_table(&view, TableOptions { show_record_ids: ids })
                );
            }
            CardCommand::Export {
                person_id,
                category,
                out_dir,
            } => {
                let view = service.load_view(person_id, category.as_deref()).await?;
                let path = service.export_csv_to(&view, &out_dir)?;
                println!("Exported card to {}", path.display());
            }
        },
        Commands::Vaccinate {
            person_id,
            vaccine,
            slot,
            date,
            category,
        } => {
            let applied_on = match date {
                Some(raw) => parse_application_date(&raw)?,
                None => chrono::Local::now().date_naive(),
            };
            service.load_view(person_id, category.as_deref()).await?;
            let view = service.register_dose(&vaccine, &slot, applied_on).await?;
            println!(
                "Recorded {slot} of {vaccine} for {} on {}",
                view.person().name,
                service.config().format_date(applied_on)
            );
        }
        Commands::Unvaccinate { record_id } => {
            let message = client.delete_vaccination(record_id).await?;
            println!(
                "{}",
                message.unwrap_or_else(|| format!("Deleted vaccination {record_id}"))
            );
        }
        Commands::Slots => {
            for slot in DoseSlot::ALL {
                println!("{:<12} {}", slot.label(), slot.display_label());
            }
        }
    }

    Ok(())
}

fn report(err: &anyhow::Error) {
    eprintln!("Error: {err}");
    if let Some(client_err) = err.downcast_ref::<ClientError>() {
        for message in client_err.field_messages() {
            eprintln!("  {message}");
        }
        if client_err.requires_login() {
            eprintln!("Run 'cartao login <username>' to start a new session.");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cartao=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'cartao --help' for commands");
        return Ok(());
    };

    let service = build_service()?;
    if let Err(err) = run(command, &service).await {
        report(&err);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_vaccinate_arguments() {
        let cli = Cli::try_parse_from([
            "cartao",
            "vaccinate",
            "7",
            "HEPATITE B",
            "2a Dose",
            "--date",
            "2024-03-10",
        ])
        .expect("parse");

        match cli.command {
            Some(Commands::Vaccinate {
                person_id,
                vaccine,
                slot,
                date,
                category,
            }) => {
                assert_eq!(person_id, PersonId(7));
                assert_eq!(vaccine, "HEPATITE B");
                assert_eq!(slot, "2a Dose");
                assert_eq!(date.as_deref(), Some("2024-03-10"));
                assert!(category.is_none());
            }
            _ => panic!("expected vaccinate command"),
        }
    }

    #[test]
    fn vaccine_category_defaults_to_national() {
        let cli = Cli::try_parse_from(["cartao", "vaccines", "add", "BCG"]).expect("parse");
        match cli.command {
            Some(Commands::Vaccines {
                action: VaccinesCommand::Add { category, .. },
            }) => assert_eq!(category, "Nacional"),
            _ => panic!("expected vaccines add"),
        }
    }

    #[test]
    fn rejects_non_numeric_person_id() {
        assert!(Cli::try_parse_from(["cartao", "card", "show", "abc"]).is_err());
    }
}
