use tracing::info;

use crate::repository::Repository;

struct SeedUser {
    handle: &'static str,
    email: &'static str,
    bio: &'static str,
    photo: &'static str,
    password: &'static str,
    posts: &'static [&'static str],
}

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        handle: "rich",
        email: "rich@hello.com",
        bio: "It's me!",
        photo: "rich.png",
        password: "buttons",
        posts: &[
            "Hello world! #hi",
            "My friend Jack claims he can communicate with vegetables. I guess you could say... Jack and the beans talk. #funny",
        ],
    },
    SeedUser {
        handle: "jack",
        email: "jack@hello.com",
        bio: "Drink! Feck! Girls!",
        photo: "jack.png",
        password: "jack",
        posts: &["\"We're gonna need more chalk.\" - detective who discovers my body. #murder"],
    },
    SeedUser {
        handle: "paul",
        email: "paul@hello.com",
        bio: "It's me, Paul!",
        photo: "paul.png",
        password: "paul",
        posts: &[
            "*a jerk tries to punch me but I catch it perfectly in my mouth and swallow him whole like a snake.* #imawesome",
            "me: I just want 2 minutes of privacy in the bathroom. my kid: best I can do is a paleontology lecture.",
        ],
    },
    SeedUser {
        handle: "perry",
        email: "perry@hello.com",
        bio: "It's me, Perry!",
        photo: "perry.png",
        password: "perry",
        posts: &[
            "[first day as a spy] Wife: what's your bosses name? Me: I can't tell you that Wife: why? Me: because I don't remember, Linda. #spy",
        ],
    },
    SeedUser {
        handle: "joan",
        email: "joan@hello.com",
        bio: "It's me, Joan!",
        photo: "joan.jpg",
        password: "joan",
        posts: &["I'm a cat person. #cat"],
    },
    SeedUser {
        handle: "may",
        email: "may@hello.com",
        bio: "It's me, May!",
        photo: "may.png",
        password: "may",
        posts: &["I'm a dog person. #dog @joan"],
    },
    SeedUser {
        handle: "kate",
        email: "kate@hello.com",
        bio: "It's me, Kate!",
        photo: "kiki.jpg",
        password: "kate",
        posts: &[],
    },
    SeedUser {
        handle: "rutger",
        email: "rutger@hello.com",
        bio: "I've seen things you people wouldn't believe...",
        photo: "rutger.png",
        password: "rutger",
        posts: &[],
    },
];

const SEED_FOLLOWS: &[(&str, &str)] = &[
    ("rich", "paul"),
    ("rich", "kate"),
    ("rich", "perry"),
    ("rich", "joan"),
    ("rich", "may"),
    ("rich", "jack"),
    ("paul", "perry"),
    ("perry", "rich"),
    ("joan", "rich"),
    ("may", "rich"),
    ("may", "joan"),
    ("may", "kate"),
    ("rutger", "rich"),
    ("rutger", "kate"),
    ("rutger", "joan"),
    ("rutger", "may"),
];

/// Populates a demo community. Users that already exist are left alone
/// along with their posts, so running it twice changes nothing.
pub fn seed_demo_data(repo: &Repository) -> anyhow::Result<()> {
    let mut created = 0;
    for user in SEED_USERS {
        if repo.is_registered(user.handle) {
            continue;
        }
        repo.register(user.handle, user.email, user.bio, user.photo, user.password)?;
        for text in user.posts {
            repo.create_post(user.handle, text)?;
        }
        created += 1;
    }

    for (follower, followee) in SEED_FOLLOWS {
        repo.follow(follower, followee);
    }

    info!(created, "seeded demo data");
    Ok(())
}

pub fn reset_repository(repo: &Repository) {
    repo.clear();
    info!("repository reset");
}
