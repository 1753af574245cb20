use crate::infra::{
    parse_pronoun, InMemoryCommentCatalog, InMemoryCommentCopier, InMemoryFinalCommentStore,
};
use clap::Args;
use comment_composer::config::{AppConfig, CompositionConfig};
use comment_composer::error::AppError;
use comment_composer::workflows::comment_bank::CommentBankImporter;
use comment_composer::workflows::final_comment::{
    emoji_for, label_for, normalize, sort_by_rating_desc, CommentId, CompositionInputs,
    CopyCommentsRequest, FinalCommentService, OutcomeComment, PersonalizedComment,
    PopulateEffect, Pronoun, PronounId, SessionEvent, StudentDetails, SubjectId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ComposeArgs {
    /// Outcome comment bank CSV (Lower Range,Upper Range,Comment)
    #[arg(long)]
    pub(crate) outcomes: PathBuf,
    /// Personalized comment bank CSV (Comment,Rating)
    #[arg(long)]
    pub(crate) personalized: PathBuf,
    /// Student grade used to pick the outcome band
    #[arg(long)]
    pub(crate) grade: Option<f64>,
    /// 1-based position in the rating-sorted personalized listing
    #[arg(long)]
    pub(crate) comment_index: Option<usize>,
    /// Pronoun pair used for placeholders, e.g. they/their
    #[arg(long, value_parser = parse_pronoun)]
    pub(crate) pronoun: Option<Pronoun>,
    /// Use the extended comment length limit
    #[arg(long)]
    pub(crate) extended: bool,
}

pub(crate) fn run_compose(args: ComposeArgs) -> Result<(), AppError> {
    let ComposeArgs {
        outcomes,
        personalized,
        grade,
        comment_index,
        pronoun,
        extended,
    } = args;

    let limits = AppConfig::load()?.composition;
    let subject = SubjectId("cli".to_string());
    let bands = CommentBankImporter::outcomes_from_path(&outcomes, &subject)?;
    let bank = sort_by_rating_desc(&CommentBankImporter::personalized_from_path(
        &personalized,
        &subject,
    )?);

    println!(
        "Loaded {} outcome bands and {} personalized comments",
        bands.len(),
        bank.len()
    );
    render_bank(&bank);

    let selected = match comment_index {
        Some(index) => match index.checked_sub(1).and_then(|offset| bank.get(offset)) {
            Some(comment) => Some(comment),
            None => {
                println!(
                    "No personalized comment #{index}; the bank has {} entries",
                    bank.len()
                );
                None
            }
        },
        None => None,
    };

    let policy = limits.policy(extended);
    let candidate = policy.candidate(CompositionInputs {
        grade,
        outcome_comments: &bands,
        personalized: selected,
        pronoun: pronoun.as_ref(),
    });

    println!();
    match (&candidate.matched_outcome, grade) {
        (Some(band), _) => println!(
            "Outcome band {}-{}: {}",
            band.lower_range, band.upper_range, band.text
        ),
        (None, Some(grade)) => println!("No outcome band covers grade {grade}"),
        (None, None) => println!("No grade given; outcome comment skipped"),
    }
    if let Some(comment) = selected {
        println!("Personalized comment: {}", comment.text);
    }

    if candidate.is_empty() {
        println!("Nothing to compose");
        return Ok(());
    }
    println!(
        "Candidate ({} of {} characters{}):",
        candidate.text.chars().count(),
        policy.max_length(),
        if candidate.truncated { ", truncated" } else { "" }
    );
    println!("{}", candidate.text);

    Ok(())
}

fn render_bank(bank: &[PersonalizedComment]) {
    for (position, comment) in bank.iter().enumerate() {
        let rating = normalize(comment.rating);
        println!(
            "  {:>2}. {} {:<13} {}",
            position + 1,
            emoji_for(rating),
            label_for(rating),
            comment.text
        );
    }
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let math = SubjectId("math".to_string());
    let catalog = InMemoryCommentCatalog::with_banks(&math, demo_outcomes(&math), demo_bank(&math));
    let store = Arc::new(InMemoryFinalCommentStore::default());
    let service = FinalCommentService::new(
        Arc::new(catalog.clone()),
        store,
        Arc::new(InMemoryCommentCopier::new(catalog)),
        CompositionConfig::default(),
    );

    println!("Final comment composition demo");
    let views = service.personalized_comments(&math, Default::default())?;
    println!("Personalized comments for {math}, most positive first:");
    for view in &views {
        println!("  - {} {} [{}]", view.emoji, view.text, view.id);
    }

    let mut session = service.open_session(&math, false)?;
    let steps = [
        ("Enter grade 95", SessionEvent::GradeChanged(Some(95.0))),
        (
            "Pick a personalized comment",
            SessionEvent::PersonalizedSelected(Some(CommentId("demo-kind".to_string()))),
        ),
        ("Click populate", SessionEvent::Populate),
        ("Cancel the overwrite", SessionEvent::CancelReplace),
        (
            "Pick they/their",
            SessionEvent::PronounSelected(Some(Pronoun {
                id: PronounId("they".to_string()),
                subject_pronoun: "they".to_string(),
                possessive_pronoun: "their".to_string(),
            })),
        ),
        ("Click populate again", SessionEvent::Populate),
        ("Confirm the overwrite", SessionEvent::ConfirmReplace),
    ];

    for (label, event) in steps {
        let effect = session.apply(event);
        println!("\n> {label}");
        println!("  effect: {}", describe(effect));
        println!("  candidate: {}", session.candidate().text);
        println!("  draft:     {}", session.draft().text);
    }

    let student = StudentDetails {
        first_name: "Avery".to_string(),
        last_name: "Lee".to_string(),
        grade: 95.0,
    };
    match session.submit(service.store(), student) {
        Ok(record) => println!(
            "\nSubmitted {} for {} {}: {}",
            record.id, record.first_name, record.last_name, record.comment
        ),
        Err(err) => println!("\nSubmit failed, draft kept: {err}"),
    }

    let science = SubjectId("science".to_string());
    let copied = service.copy_comments(CopyCommentsRequest {
        source_subject_id: math.clone(),
        target_subject_id: science.clone(),
        overwrite: false,
    })?;
    println!("\nCopy {math} -> {science}: {}", copied.message);
    let again = service.copy_comments(CopyCommentsRequest {
        source_subject_id: math,
        target_subject_id: science,
        overwrite: false,
    })?;
    println!("Copy again: {}", again.message);

    Ok(())
}

fn describe(effect: PopulateEffect) -> &'static str {
    match effect {
        PopulateEffect::Applied => "draft replaced, focus moved to the comment field",
        PopulateEffect::ConfirmationRequired => "asking before overwriting the draft",
        PopulateEffect::Dismissed => "dialog closed, draft unchanged",
        PopulateEffect::Unchanged => "no change to the draft",
        PopulateEffect::Disabled => "populate unavailable",
    }
}

fn demo_outcomes(subject: &SubjectId) -> Vec<OutcomeComment> {
    [
        ("demo-band-a", 80, 100, "Great work this term."),
        ("demo-band-b", 65, 79, "{{pronoun}} made steady progress."),
        ("demo-band-c", 0, 64, "{{pronoun}} should revisit {{possessivePronoun}} notes weekly."),
    ]
    .into_iter()
    .map(|(id, lower, upper, text)| OutcomeComment {
        id: CommentId(id.to_string()),
        text: text.to_string(),
        lower_range: lower,
        upper_range: upper,
        subject_id: subject.clone(),
    })
    .collect()
}

fn demo_bank(subject: &SubjectId) -> Vec<PersonalizedComment> {
    [
        ("demo-kind", "{{pronoun}} is kind to classmates.", Some(4.0)),
        ("demo-focus", "Needs reminders to stay on task.", Some(2.0)),
        ("demo-lead", "Leads group work with {{possessivePronoun}} ideas.", Some(5.0)),
        ("demo-homework", "Completes homework on time.", None),
    ]
    .into_iter()
    .map(|(id, text, rating)| PersonalizedComment {
        id: CommentId(id.to_string()),
        text: text.to_string(),
        rating,
        subject_id: subject.clone(),
    })
    .collect()
}
