use classlog_cli::seeder::{self, SeedConfig, SeedResult, UserSeed};
use classlog_core::UserRole;
use classlog_core::fields::is_valid_email;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser)]
#[command(name = "classlog-cli")]
#[command(about = "Classlog CLI - Administrative tools for Classlog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a new administrator account
    CreateAdmin {
        /// Full name of the admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Create demo accounts for every role and a sample class
    SeedDemo,
    /// Seed the database with fake teachers, classes, students and contacts
    Seed {
        /// Number of teachers to create
        #[arg(short = 't', long, default_value = "3")]
        teachers: usize,

        /// Number of classes per teacher
        #[arg(long, default_value = "2")]
        classes: usize,

        /// Number of students per class
        #[arg(long, default_value = "20")]
        students: usize,

        /// Number of contacts logged per student
        #[arg(long, default_value = "2")]
        contacts: usize,
    },
    /// Clear classes, students, contacts and non-admin users
    Clear,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match classlog_db::init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::SeedDemo => seeder::seed_demo(&pool).await,
        Commands::Seed {
            teachers,
            classes,
            students,
            contacts,
        } => {
            let config = SeedConfig::new(teachers)
                .with_classes(classes)
                .with_students(students)
                .with_contacts(contacts);
            seeder::seed_all(&pool, config).await
        }
        Commands::Clear => seeder::clear_all(&pool).await.map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn handle_migrate(pool: &PgPool) -> SeedResult<()> {
    classlog_db::run_migrations(pool).await?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> SeedResult<()> {
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Full name").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let seed = admin_seed(&name, &email, &password)?;

    match seeder::users::insert_user(pool, &seed).await? {
        Some(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", seed.email);
            println!("   Name: {}", seed.name);
            Ok(())
        }
        None => Err(format!("A user with email {} already exists", seed.email).into()),
    }
}

/// Checks the prompted values and builds the account to insert.
fn admin_seed(name: &str, email: &str, password: &str) -> SeedResult<UserSeed> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name must not be empty".into());
    }

    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err("Email must be in the format example@email.com".into());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN).into());
    }

    Ok(UserSeed {
        name: name.to_string(),
        email,
        password_hash: seeder::hash_seed_password(password)?,
        role: UserRole::Admin,
    })
}
