use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use study_tutor::accounts::{self, Argon2Hasher};
use study_tutor::config::AppConfig;
use study_tutor::db::{connect_and_migrate, establish_connection, run_migrations};
use study_tutor::services::gateway::Gateway;
use study_tutor::services::llm;
use study_tutor::tutor::{ChatForm, ChatSetup, Exchange};
use study_tutor::Tutor;

/// Command line front-end for the study tutor
#[derive(Parser)]
#[command(name = "study-tutor")]
#[command(about = "A conversational study tutor that turns lessons into quizzes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Register a new account
    Register { username: String, password: String },
    /// Create a chat for an account
    NewChat {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        attitude: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        quiz_length: Option<i32>,
        #[arg(long)]
        education_level: Option<String>,
        #[arg(long)]
        study_area: Option<String>,
    },
    /// List the chats of an account
    Chats {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Send a message and wait for the tutor's reply
    Send {
        chat_id: i32,
        message: String,
        /// Ask the tutor for a quiz on the conversation so far
        #[arg(long)]
        quiz: bool,
    },
    /// Print the messages of a chat
    History { chat_id: i32 },
    /// Print the questions and options of a quiz
    Quiz { message_id: i32 },
    /// Answer one question of a quiz
    Answer {
        message_id: i32,
        question: i32,
        option: String,
    },
    /// Show the answers and score of one attempt
    Results {
        message_id: i32,
        /// Defaults to the latest attempt
        #[arg(long)]
        attempt: Option<i32>,
    },
    /// Delete a chat and everything in it
    DeleteChat { chat_id: i32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    if let Commands::Migrate = cli.command {
        let db = establish_connection(&config.database_url).await?;
        run_migrations(&db).await?;
        return Ok(());
    }

    let db = connect_and_migrate(&config.database_url).await?;
    let gateway = Gateway::new(llm::from_config(&config), config.sampling)
        .with_history_limit(config.history_limit);
    let tutor = Tutor::new(db, gateway);
    let hasher = Argon2Hasher::default();

    match cli.command {
        Commands::Migrate => {}
        Commands::Register { username, password } => {
            let user = accounts::register(tutor.db(), &hasher, &username, &password).await?;
            println!("Registered {} (id {})", user.username, user.id);
        }
        Commands::NewChat {
            username,
            password,
            name,
            attitude,
            difficulty,
            quiz_length,
            education_level,
            study_area,
        } => {
            let user = accounts::authenticate(tutor.db(), &hasher, &username, &password).await?;
            let form = ChatForm {
                name: Some(name),
                response_attitude: attitude,
                quiz_difficulty: difficulty,
                quiz_length,
                education_level,
                study_area,
            };
            let chat = tutor.setup_chat(ChatSetup::create(user.id, form)).await?;
            println!("Created chat {} \"{}\"", chat.id, chat.name);
        }
        Commands::Chats { username, password } => {
            let user = accounts::authenticate(tutor.db(), &hasher, &username, &password).await?;
            for chat in tutor.list_chats(user.id).await? {
                println!(
                    "{:>4}  {}  ({}, {} quiz, {} questions)",
                    chat.id, chat.name, chat.response_attitude, chat.quiz_difficulty, chat.quiz_length
                );
            }
        }
        Commands::Send {
            chat_id,
            message,
            quiz,
        } => {
            // Cancelling before the reply is stored leaves no reply behind.
            tokio::select! {
                exchange = tutor.send_message(chat_id, &message, quiz) => print_exchange(&exchange?),
                _ = tokio::signal::ctrl_c() => warn!("Cancelled while waiting for the tutor"),
            }
        }
        Commands::History { chat_id } => {
            for message in tutor.get_chat_messages(chat_id).await? {
                let author = if message.from_user { "you" } else { "tutor" };
                let marker = if message.is_quiz { " [quiz]" } else { "" };
                println!("#{} {}{}: {}", message.id, author, marker, message.content);
            }
        }
        Commands::Quiz { message_id } => {
            let runtime = tutor.runtime();
            let quiz = runtime.get_quiz(message_id).await?;
            println!("{} ({})", quiz.name, quiz.difficulty);
            for question in runtime.get_quiz_questions(message_id).await? {
                println!("\n{}. {}", question.number, question.question_text);
                for option in runtime
                    .get_question_answer_options(message_id, question.number)
                    .await?
                {
                    println!("   {}) {}", option.label, option.value);
                }
            }
        }
        Commands::Answer {
            message_id,
            question,
            option,
        } => {
            let answer = tutor
                .runtime()
                .create_user_answer(message_id, question, &option)
                .await?;
            println!(
                "Recorded \"{}\" for question {} (attempt {})",
                answer.chosen_option, answer.question_number, answer.attempt
            );
        }
        Commands::Results {
            message_id,
            attempt,
        } => {
            let runtime = tutor.runtime();
            let attempt = match attempt {
                Some(a) => a,
                None => runtime.latest_attempt(message_id).await?,
            };
            for answer in runtime.get_quiz_user_answers(message_id, attempt).await? {
                println!("{}. {}", answer.question_number, answer.chosen_option);
            }
            let score = runtime.grade_attempt(message_id, attempt).await?;
            println!(
                "Attempt {}: {}/{} correct ({} answered)",
                attempt, score.correct, score.total, score.answered
            );
        }
        Commands::DeleteChat { chat_id } => {
            tutor.delete_chat(chat_id).await?;
            info!("Chat {} deleted", chat_id);
        }
    }

    Ok(())
}

fn print_exchange(exchange: &Exchange) {
    println!("tutor: {}", exchange.reply.reply.content);
    for quiz in &exchange.reply.quizzes {
        println!(
            "New quiz \"{}\" ({}). Take it with: study-tutor quiz {}",
            quiz.name, quiz.difficulty, quiz.message_id
        );
    }
}
