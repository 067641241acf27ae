use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use adaptive_quiz::protocol::{LoginRequest, QuizBatchRequest};
use adaptive_quiz::{
    App, LearningClient, QuizError, QuizSession, SavedSession, SessionStore, StudentProgress,
    Subject, data,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the learning service
    #[arg(long, env = "ADAPTIVE_QUIZ_API_URL", default_value = "http://localhost:8000")]
    server: String,

    /// Class level (1-5), ignored when logged in
    #[arg(long, default_value_t = 1)]
    class: u8,

    /// Subject to practice
    #[arg(long, value_enum, default_value_t = Subject::Math)]
    subject: Subject,

    /// Chapter id, e.g. class1-math-shapes-and-space
    #[arg(long, required_unless_present_any = ["mastery", "review"])]
    chapter: Option<String>,

    /// Quiz set id within the chapter, e.g. shapes-quiz-1
    #[arg(long, default_value = "")]
    quiz_set: String,

    /// Ask the service to generate the quiz instead of using built-in content
    #[arg(long)]
    generated: bool,

    /// Log in with this email (requires --password)
    #[arg(long, requires = "password")]
    email: Option<String>,

    /// Password for --email
    #[arg(long)]
    password: Option<String>,

    /// Where the login session is saved between runs
    #[arg(long, default_value = "adaptive-quiz-session.json")]
    session_file: PathBuf,

    /// Print the concept mastery report and exit
    #[arg(long)]
    mastery: bool,

    /// Print the concepts due for review and exit
    #[arg(long)]
    review: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    // The TUI owns stdout, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(QuizError::Content(e)) => {
            eprintln!("Quiz not found! ({})", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error running quiz: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), QuizError> {
    let mut client = LearningClient::new(args.server.clone());
    let store = SessionStore::new(&args.session_file);
    let (student, logged_in) = authenticate(&args, &mut client, &store).await;

    let class_level = if logged_in { student.class_level } else { args.class };

    if args.mastery || args.review {
        return print_reports(&args, &client, &student).await;
    }

    let chapter = args.chapter.clone().unwrap_or_default();

    let (quiz_set_name, questions) = if args.generated {
        let request = QuizBatchRequest {
            concept_tags: data::concept_tags(&chapter),
            class_level,
            subject_type: args.subject,
        };
        // Generation failure or an empty batch means there is no quiz to
        // run; never start a session on partial content.
        let not_found = || adaptive_quiz::NotFound {
            class_level,
            subject: args.subject,
            chapter_id: chapter.clone(),
            quiz_set_id: "generated".to_string(),
        };
        let questions = match client.generate_quiz_batch(&request).await {
            Ok(questions) if !questions.is_empty() => questions,
            Ok(_) => return Err(not_found().into()),
            Err(e) => {
                tracing::warn!(error = %e, "quiz generation failed");
                return Err(not_found().into());
            }
        };
        ("Generated Quiz".to_string(), questions)
    } else {
        let set = data::quiz_set(class_level, args.subject, &chapter, &args.quiz_set)?;
        (set.name.clone(), set.questions.clone())
    };

    let mut rng = StdRng::from_os_rng();
    let session = QuizSession::new(
        student.id,
        class_level,
        args.subject,
        chapter,
        quiz_set_name,
        questions,
        &mut rng,
    );

    let mut app = App::new(session, student, client);
    app.run().await?;

    // Persist accumulated stars and topics for the next run.
    if logged_in {
        if let Some(mut saved) = store.load() {
            saved.student = app.student().clone();
            if let Err(e) = store.save(&saved) {
                tracing::warn!(error = %e, "could not save progress");
            }
        }
    }

    Ok(())
}

/// Print the mastery and/or review reports instead of running a quiz.
async fn print_reports(
    args: &Args,
    client: &LearningClient,
    student: &StudentProgress,
) -> Result<(), QuizError> {
    if args.mastery {
        let status = client.mastery_status(student.id).await?;
        println!(
            "Mastered {} of {} concepts",
            status.mastered_concepts, status.total_concepts
        );
        for record in &status.mastery_records {
            println!(
                "  {:<24} {:>5.0}%  ({}/{} correct)",
                record.concept_tag,
                record.mastery_level * 100.0,
                record.successful_attempts,
                record.total_attempts
            );
        }
    }
    if args.review {
        let review = client.review_concepts(student.id).await?;
        println!("{} concepts due for review", review.total_to_review);
    }
    Ok(())
}

/// Resolve the student: explicit login, saved session, or guest.
async fn authenticate(
    args: &Args,
    client: &mut LearningClient,
    store: &SessionStore,
) -> (StudentProgress, bool) {
    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let request = LoginRequest {
            email: email.clone(),
            password: password.clone(),
        };
        match client.login(&request).await {
            Ok(token) => {
                client.set_token(token.access_token.clone());
                match client.me().await {
                    Ok(profile) => {
                        let student = StudentProgress::from_profile(&profile);
                        let saved = SavedSession {
                            token: token.access_token,
                            student: student.clone(),
                        };
                        if let Err(e) = store.save(&saved) {
                            tracing::warn!(error = %e, "could not save session");
                        }
                        return (student, true);
                    }
                    Err(e) => tracing::warn!(error = %e, "profile fetch failed"),
                }
            }
            Err(e) => tracing::warn!(error = %e, "login failed, continuing as guest"),
        }
    } else if let Some(saved) = store.load() {
        client.set_token(saved.token);
        // Refresh the profile when the token is still valid; otherwise the
        // saved counters are better than nothing.
        return match client.me().await {
            Ok(profile) => {
                let mut student = StudentProgress::from_profile(&profile);
                student.completed_topics = saved.student.completed_topics;
                student.stars = saved.student.stars;
                student.badges = saved.student.badges;
                (student, true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved session rejected, continuing as guest");
                (StudentProgress::guest(args.class), false)
            }
        };
    }

    (StudentProgress::guest(args.class), false)
}
