use chrono::{Duration, Utc};
use clap::Parser;
use clubhub::{
    auth::AuthService,
    config::Settings,
    domain::{
        ClubCategory, CreateAnnouncementRequest, CreateClubRequest, CreateEventRequest,
        EventType, MeetingSchedule, NewUser, Priority, SocialLinks, TargetAudience, User,
        UserRole, Weekday,
    },
    service::ServiceContext,
};
use fake::{
    faker::{internet::en::SafeEmail, lorem::en::Words, name::en::Name},
    Fake,
};
use rand::seq::SliceRandom;
use sqlx::sqlite::SqlitePoolOptions;

/// Fills a ClubHub database with demo clubs, events and announcements.
#[derive(Debug, Parser)]
struct Args {
    /// SQLite connection string
    #[arg(long, default_value = "sqlite://clubhub.db?mode=rwc")]
    database_url: String,

    /// Extra randomly generated students
    #[arg(long, default_value_t = 20)]
    students: usize,

    /// Password given to every seeded account
    #[arg(long, default_value = "password123")]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let settings = Settings::new().unwrap_or_default();
    let ctx = ServiceContext::from_pool(db_pool, &settings.auth);

    // Users
    println!("👥 Creating users...");
    let password_hash = AuthService::hash_password(&args.password)?;
    let create_user = |name: &str, email: &str, role: UserRole| NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.clone(),
        role,
    };

    let admin = ctx
        .user_repo
        .create(create_user("Admin User", "admin@clubhub.local", UserRole::Admin))
        .await?;
    let alice = ctx
        .user_repo
        .create(create_user("Alice Johnson", "alice@clubhub.local", UserRole::ClubLeader))
        .await?;
    let bob = ctx
        .user_repo
        .create(create_user("Bob Smith", "bob@clubhub.local", UserRole::ClubLeader))
        .await?;
    let carol = ctx
        .user_repo
        .create(create_user("Carol Diaz", "carol@clubhub.local", UserRole::Student))
        .await?;

    let mut students: Vec<User> = Vec::with_capacity(args.students);
    for _ in 0..args.students {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        match ctx.user_repo.create(create_user(&name, &email, UserRole::Student)).await {
            Ok(user) => students.push(user),
            // Faker can repeat an address
            Err(e) => println!("  ⚠️  Skipped {}: {}", email, e),
        }
    }
    println!(
        "  ✅ Created {} users (admin@clubhub.local / {})",
        students.len() + 4,
        args.password
    );

    // Clubs
    println!("🏛️  Creating clubs...");
    let cs_club = ctx
        .club_service
        .create(
            &alice,
            CreateClubRequest {
                name: "Computer Science Club".to_string(),
                description: "Weekly coding sessions, hackathon prep and talks from industry guests.".to_string(),
                category: ClubCategory::Technical,
                logo: String::new(),
                cover_image: String::new(),
                social_links: SocialLinks {
                    website: Some("https://cs.clubhub.local".to_string()),
                    ..Default::default()
                },
                meeting_schedule: MeetingSchedule {
                    day: Some(Weekday::Wednesday),
                    time: Some("18:00".to_string()),
                    location: Some("Engineering Building, Room 204".to_string()),
                },
                tags: vec!["programming".to_string(), "hackathons".to_string()],
            },
        )
        .await?;

    let photo_club = ctx
        .club_service
        .create(
            &bob,
            CreateClubRequest {
                name: "Photography Society".to_string(),
                description: "Photo walks around campus, darkroom access and an annual exhibition.".to_string(),
                category: ClubCategory::Cultural,
                logo: String::new(),
                cover_image: String::new(),
                social_links: SocialLinks {
                    instagram: Some("@clubhub_photo".to_string()),
                    ..Default::default()
                },
                meeting_schedule: MeetingSchedule {
                    day: Some(Weekday::Saturday),
                    time: Some("10:00".to_string()),
                    location: Some("Arts Center Lobby".to_string()),
                },
                tags: vec!["photography".to_string(), "art".to_string()],
            },
        )
        .await?;

    let basketball = ctx
        .club_service
        .create(
            &bob,
            CreateClubRequest {
                name: "Basketball Team".to_string(),
                description: "Intramural basketball with open practice twice a week for all skill levels.".to_string(),
                category: ClubCategory::Sports,
                logo: String::new(),
                cover_image: String::new(),
                social_links: SocialLinks::default(),
                meeting_schedule: MeetingSchedule {
                    day: Some(Weekday::Tuesday),
                    time: Some("19:30".to_string()),
                    location: Some("Recreation Center Court 2".to_string()),
                },
                tags: vec!["sports".to_string(), "fitness".to_string()],
            },
        )
        .await?;

    ctx.club_service.join(carol.id, cs_club.id).await?;
    ctx.club_service.join(carol.id, photo_club.id).await?;

    let clubs = [cs_club.id, photo_club.id, basketball.id];
    let picks: Vec<(uuid::Uuid, Vec<uuid::Uuid>)> = {
        let mut rng = rand::thread_rng();
        students
            .iter()
            .map(|s| (s.id, clubs.choose_multiple(&mut rng, 2).copied().collect()))
            .collect()
    };
    for (student_id, club_ids) in &picks {
        for club_id in club_ids {
            ctx.club_service.join(*student_id, *club_id).await?;
        }
    }
    println!("  ✅ Created 3 clubs with members");

    // Events
    println!("📅 Creating events...");
    let now = Utc::now();
    let workshop = ctx
        .event_service
        .create(
            &alice,
            CreateEventRequest {
                title: "Intro to Rust Workshop".to_string(),
                description: "Hands-on session covering ownership, borrowing and building a small CLI.".to_string(),
                club: cs_club.id,
                event_type: EventType::Workshop,
                start_date: now + Duration::days(7),
                end_date: now + Duration::days(7) + Duration::hours(3),
                location: "Engineering Building".to_string(),
                venue: "Lab 3".to_string(),
                max_participants: 20,
                registration_deadline: Some(now + Duration::days(6)),
                is_registration_required: true,
                registration_fee: 0.0,
                images: Vec::new(),
                tags: vec!["rust".to_string()],
            },
        )
        .await?;

    ctx.event_service
        .create(
            &bob,
            CreateEventRequest {
                title: "Spring Photo Exhibition".to_string(),
                description: "A showcase of member work from this semester's photo walks.".to_string(),
                club: photo_club.id,
                event_type: EventType::Cultural,
                start_date: now + Duration::days(14),
                end_date: now + Duration::days(14) + Duration::hours(5),
                location: "Arts Center".to_string(),
                venue: "Main Gallery".to_string(),
                max_participants: 0,
                registration_deadline: None,
                is_registration_required: false,
                registration_fee: 0.0,
                images: Vec::new(),
                tags: vec!["exhibition".to_string()],
            },
        )
        .await?;

    ctx.event_service
        .create(
            &bob,
            CreateEventRequest {
                title: "3v3 Tournament".to_string(),
                description: "Half-court tournament; sign up as a team of three.".to_string(),
                club: basketball.id,
                event_type: EventType::Competition,
                start_date: now + Duration::days(21),
                end_date: now + Duration::days(21) + Duration::hours(4),
                location: "Recreation Center".to_string(),
                venue: "Courts 1-3".to_string(),
                max_participants: 24,
                registration_deadline: Some(now + Duration::days(19)),
                is_registration_required: true,
                registration_fee: 5.0,
                images: Vec::new(),
                tags: vec!["tournament".to_string()],
            },
        )
        .await?;

    ctx.event_service.register(carol.id, workshop.id).await?;
    for student in students.iter().take(5) {
        if let Err(e) = ctx.event_service.register(student.id, workshop.id).await {
            println!("  ⚠️  Could not register {}: {}", student.email, e);
        }
    }
    println!("  ✅ Created 3 events with registrations");

    // Announcements
    println!("📢 Creating announcements...");
    ctx.announcement_service
        .create(
            &admin,
            CreateAnnouncementRequest {
                title: "Welcome to ClubHub".to_string(),
                content: "Browse clubs, register for events and keep up with campus news in one place.".to_string(),
                club: None,
                priority: Priority::High,
                target_audience: TargetAudience::All,
                target_club: None,
                target_users: Vec::new(),
                attachments: Vec::new(),
                expires_at: None,
                tags: vec!["welcome".to_string()],
            },
        )
        .await?;

    ctx.announcement_service
        .create(
            &alice,
            CreateAnnouncementRequest {
                title: "Workshop laptops".to_string(),
                content: "Bring a laptop with Rust installed to the workshop; loaners are limited.".to_string(),
                club: Some(cs_club.id),
                priority: Priority::Medium,
                target_audience: TargetAudience::ClubMembers,
                target_club: None,
                target_users: Vec::new(),
                attachments: Vec::new(),
                expires_at: Some(now + Duration::days(8)),
                tags: Vec::new(),
            },
        )
        .await?;

    let words: Vec<String> = Words(3..6).fake();
    ctx.announcement_service
        .create(
            &bob,
            CreateAnnouncementRequest {
                title: "Court booking changed".to_string(),
                content: format!("Practice moves to Court 3 this week. Keywords: {}.", words.join(" ")),
                club: Some(basketball.id),
                priority: Priority::Urgent,
                target_audience: TargetAudience::SpecificClub,
                target_club: Some(basketball.id),
                target_users: Vec::new(),
                attachments: Vec::new(),
                expires_at: None,
                tags: Vec::new(),
            },
        )
        .await?;
    println!("  ✅ Created 3 announcements");

    println!("🎉 Seeding complete!");
    Ok(())
}
