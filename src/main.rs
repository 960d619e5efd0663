use std::env::{args, var};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use coursette::conductors::Conductor;
use coursette::prefs::FilePreferences;
use coursette::{in_memory, mongo};

async fn async_main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let prefs = Arc::new(FilePreferences::open(prefs_path()));

    let conductor = match get_values() {
        Some(MongoValues { uri, db }) => match mongo(uri, db, prefs).await {
            Ok(c) => c,
            Err(e) => return eprintln!("cannot reach mongodb: {}", e),
        },
        None => {
            eprintln!("no mongodb configured, running on the in-memory store");
            in_memory(prefs)
        },
    };

    if let Err(e) = conductor.session.resume().await {
        tracing::warn!("cannot resume previous session: {}", e);
    }
    conductor.session.spawn_watcher();

    repl(conductor).await
}

async fn repl(conductor: Conductor) {
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = tokio::task::spawn_blocking(|| {
            let mut buf = String::new();
            match std::io::stdin().read_line(&mut buf) {
                Ok(0) => None,
                Ok(_) => Some(buf),
                Err(e) => {
                    eprintln!("cannot read stdin: {}", e);
                    None
                },
            }
        })
        .await
        .unwrap_or(None);

        let line = match line {
            Some(l) => l,
            None => return,
        };

        for resp in conductor.conduct(line.trim()).await {
            println!("{}", resp.render());
        }
    }
}

fn main() {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name_fn(|| {
            static NUM: AtomicU32 = AtomicU32::new(0);
            format!("coursette-worker-{}", NUM.fetch_add(1, Ordering::Relaxed))
        })
        .build()
    {
        Ok(r) => r,
        Err(e) => return eprintln!("{}", e),
    };

    rt.block_on(async_main())
}

struct MongoValues {
    uri: String,
    db: String,
}

fn get_values() -> Option<MongoValues> {
    let mut args = args();
    args.next(); // skip the binary name

    let uri = args.next().or_else(|| var("MONGODB_URI").ok())?;
    let db = args
        .next()
        .or_else(|| var("MONGODB_DB").ok())
        .unwrap_or_else(|| "coursette".to_string());

    Some(MongoValues { uri, db })
}

fn prefs_path() -> PathBuf {
    match var("COURSETTE_PREFS") {
        Ok(p) => PathBuf::from(p),
        Err(_) => PathBuf::from("coursette-prefs.json"),
    }
}
