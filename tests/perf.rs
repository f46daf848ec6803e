use std::sync::Arc;
use std::time::Instant;

use pubsub::Repository;

const NUM_USERS: usize = 1000;
const POSTS_PER_USER: usize = 20;
const FOLLOWS_PER_USER: usize = 50;
const FEED_READS: usize = 2000;
const FEED_LIMIT: usize = 50;
const LOADED_USER_NAME: &str = "bob";
const LOADED_USER_POSTS: usize = 50_000;

fn handle(i: usize) -> String {
    format!("perf_user_{}", i)
}

#[ignore]
#[tokio::test(flavor = "multi_thread")]
async fn perf_test_users_with_posts_and_feeds() {
    let repo = Arc::new(Repository::new());
    let start = Instant::now();

    println!("\n=== Performance Test ===");
    println!(
        "{} users, {} posts each, {} follows each",
        NUM_USERS, POSTS_PER_USER, FOLLOWS_PER_USER
    );

    // Writers: one task per user, all contending on the same repository
    let write_start = Instant::now();
    let mut writers = Vec::with_capacity(NUM_USERS);
    for i in 0..NUM_USERS {
        let repo = Arc::clone(&repo);
        writers.push(tokio::task::spawn_blocking(move || {
            let me = handle(i);
            for f in 1..=FOLLOWS_PER_USER {
                repo.follow(&me, &handle((i + f * 7) % NUM_USERS));
            }
            for n in 0..POSTS_PER_USER {
                repo.create_post(&me, &format!("Post {} from {} #perf #t{}", n, me, n % 10))
                    .unwrap();
            }
        }));
    }
    for w in writers {
        w.await.unwrap();
    }
    let write_time = write_start.elapsed();

    // Readers: feed assembly under concurrent load
    let read_start = Instant::now();
    let mut readers = Vec::with_capacity(FEED_READS);
    for i in 0..FEED_READS {
        let repo = Arc::clone(&repo);
        readers.push(tokio::task::spawn_blocking(move || {
            let feed = repo.feed_for(&handle(i % NUM_USERS), Some(FEED_LIMIT));
            assert_eq!(feed.len(), FEED_LIMIT);
        }));
    }
    for r in readers {
        r.await.unwrap();
    }
    let read_time = read_start.elapsed();

    repo.check_consistency().unwrap();
    let stats = repo.stats();
    assert_eq!(stats.posts, NUM_USERS * POSTS_PER_USER);

    println!("\n=== Results ===");
    println!("Total time: {:.2}s", start.elapsed().as_secs_f64());
    println!(
        "Writes: {:.2}s ({:.0} posts/sec)",
        write_time.as_secs_f64(),
        stats.posts as f64 / write_time.as_secs_f64()
    );
    println!(
        "Feed reads: {:.2}s ({:.0} feeds/sec)",
        read_time.as_secs_f64(),
        FEED_READS as f64 / read_time.as_secs_f64()
    );
    println!("Stats: {:?}", stats);
}

#[ignore]
#[tokio::test(flavor = "multi_thread")]
async fn perf_test_load_user_with_many_posts() {
    let repo = Arc::new(Repository::new());
    repo.follow("reader", LOADED_USER_NAME);

    println!("\n=== Load User Performance Test ===");

    let post_creation_start = Instant::now();
    for n in 0..LOADED_USER_POSTS {
        repo.create_post(LOADED_USER_NAME, &format!("Post {} - Load test", n + 1))
            .unwrap();
    }
    let post_creation_time = post_creation_start.elapsed();

    // A limited feed must not pay for the whole history
    let fetch_start = Instant::now();
    let feed = repo.feed_for("reader", Some(FEED_LIMIT));
    let fetch_time = fetch_start.elapsed();
    assert_eq!(feed.len(), FEED_LIMIT);
    assert_eq!(feed[0].text, format!("Post {} - Load test", LOADED_USER_POSTS));

    let history_start = Instant::now();
    let history = repo.posts_by_user(LOADED_USER_NAME, None);
    let history_time = history_start.elapsed();
    assert_eq!(history.len(), LOADED_USER_POSTS);

    println!("\n=== Results ===");
    println!("Post creation: {:.2}s", post_creation_time.as_secs_f64());
    println!("Limited feed fetch: {:.3}ms", fetch_time.as_secs_f64() * 1000.0);
    println!("Full history fetch: {:.3}ms", history_time.as_secs_f64() * 1000.0);
}
