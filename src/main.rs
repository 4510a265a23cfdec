use clap::Parser;
use quickfix::{
    DataDir,
    cli::{self, Cli, Command, ConfigAction, EntryAction},
    entry::{CollectionKind, EntryId, NewEntry},
    error::{self, Error},
    mcp,
    search::{self, SearchParams},
    settings::{self, Setting},
    store::EntryStore,
    tokenize,
    transfer,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("QUICKFIX_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let store = EntryStore::open(&data_dir.entries_db())?;

    match cli.command {
        Command::Fix { action } => {
            entry_command(&store, CollectionKind::Fixes, action)?;
        }
        Command::Guide { action } => {
            entry_command(&store, CollectionKind::Guides, action)?;
        }
        Command::Search(args) => {
            cmd_search(&store, &args)?;
        }
        Command::Export(args) => {
            cmd_export(&store, &args)?;
        }
        Command::Import(args) => {
            cmd_import(&store, &args)?;
        }
        Command::Config { action } => match action {
            ConfigAction::Show { json } => config_show(&store, json)?,
            ConfigAction::Set { key, value } => {
                config_set(&store, &key, &value)?
            }
            ConfigAction::Clear { key } => config_clear(&store, &key)?,
        },
        Command::Status(args) => {
            cmd_status(&store, &data_dir, args.json)?;
        }
        Command::Mcp => {
            mcp::run_mcp(store)?;
        }
        Command::Completions(args) => {
            args.generate();
        }
    }

    Ok(())
}

fn entry_command(
    store: &EntryStore,
    kind: CollectionKind,
    action: EntryAction,
) -> error::Result<()> {
    match action {
        EntryAction::Add(args) => entry_add(store, kind, args),
        EntryAction::Remove { id } => entry_remove(store, kind, &id),
        EntryAction::List { json } => entry_list(store, kind, json),
        EntryAction::Show { id, json } => entry_show(store, kind, &id, json),
    }
}

fn entry_add(
    store: &EntryStore,
    kind: CollectionKind,
    args: cli::AddArgs,
) -> error::Result<()> {
    let title = args.title.trim();
    let body = args.body.trim();
    if title.is_empty() && body.is_empty() {
        return Err(Error::InvalidInput(
            "an entry needs a title or a body".to_string(),
        ));
    }

    let keywords = if args.keywords.is_empty() {
        tokenize::derive_keywords(title, body)
    } else {
        args.keywords
    };
    let author = args
        .author
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "unknown".to_string());

    let entry = store.append(
        kind,
        NewEntry::new(title, body)
            .with_tags(args.tags)
            .with_keywords(keywords)
            .with_author(author),
    )?;

    println!("Added {kind} entry {} '{}'", entry.id, entry.title);
    Ok(())
}

fn entry_remove(
    store: &EntryStore,
    kind: CollectionKind,
    id: &str,
) -> error::Result<()> {
    let id: EntryId = id.parse()?;
    if !store.remove(kind, id)? {
        return Err(Error::NotFound {
            kind: "entry",
            name: format!("{kind}:{id}"),
        });
    }
    println!("Removed {kind} entry {id}");
    Ok(())
}

fn entry_list(
    store: &EntryStore,
    kind: CollectionKind,
    json: bool,
) -> error::Result<()> {
    let entries = store.list(kind)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No {kind} recorded.");
    } else {
        for entry in &entries {
            let tags = if entry.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", entry.tags.join(", "))
            };
            println!("{}\t{}{tags}", entry.id, entry.title);
        }
    }
    Ok(())
}

fn entry_show(
    store: &EntryStore,
    kind: CollectionKind,
    id: &str,
    json: bool,
) -> error::Result<()> {
    let id: EntryId = id.parse()?;
    let entry = store.get(kind, id)?.ok_or_else(|| Error::NotFound {
        kind: "entry",
        name: format!("{kind}:{id}"),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("id: {}", entry.id);
        println!("title: {}", entry.title);
        println!("tags: {}", entry.tags.join(", "));
        println!("keywords: {}", entry.keywords.join(", "));
        println!("author: {}", entry.author);
        println!("created: {}", entry.created_at);
        println!();
        println!("{}", entry.body);
    }
    Ok(())
}

fn cmd_search(store: &EntryStore, args: &cli::SearchArgs) -> error::Result<()> {
    let config = settings::match_config(store, args.tag_bonus)?;
    let limit = settings::limit(store, args.count)?;

    let collections = match args.collection {
        Some(kind) => vec![kind],
        None => CollectionKind::ALL.to_vec(),
    };

    let mut all_results = Vec::new();
    for collection in collections {
        let params = SearchParams {
            query: args.query.clone(),
            collection,
            limit,
            all: args.all,
            config,
        };
        let results = search::execute_search(&params, store)?;

        if args.ids {
            search::format_ids(&results);
        } else if !args.json {
            search::format_human(collection, &results);
        }
        all_results.extend(results);
    }

    if args.json {
        search::format_json(&args.query, &all_results)?;
    }
    Ok(())
}

fn cmd_export(store: &EntryStore, args: &cli::ExportArgs) -> error::Result<()> {
    let count = match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let count = transfer::export(
                store,
                args.collection,
                std::io::BufWriter::new(file),
            )?;
            eprintln!(
                "Exported {count} {} to {}",
                args.collection,
                path.display()
            );
            count
        }
        None => transfer::export(store, args.collection, std::io::stdout())?,
    };
    tracing::debug!(count, "export finished");
    Ok(())
}

fn cmd_import(store: &EntryStore, args: &cli::ImportArgs) -> error::Result<()> {
    let file = std::fs::File::open(&args.file)?;
    let imported =
        transfer::import(store, args.collection, std::io::BufReader::new(file))?;
    println!(
        "Imported {} {} from {}",
        imported.len(),
        args.collection,
        args.file.display()
    );
    Ok(())
}

fn config_show(store: &EntryStore, json: bool) -> error::Result<()> {
    let mut resolved = Vec::new();
    for setting in Setting::ALL {
        let (value, source) = settings::resolve(setting, None, store)?;
        resolved.push((setting, value, source));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = resolved
            .iter()
            .map(|(setting, value, source)| {
                (
                    setting.key().to_string(),
                    serde_json::json!({
                        "value": value,
                        "source": source.as_str(),
                    }),
                )
            })
            .collect();
        println!("{}", serde_json::Value::Object(map));
    } else {
        for (setting, value, source) in &resolved {
            println!("{}\t{value}\t({})", setting.key(), source.as_str());
        }
    }
    Ok(())
}

fn config_set(store: &EntryStore, key: &str, value: &str) -> error::Result<()> {
    let setting = Setting::from_key(key)?;
    let parsed = setting.parse(value)?;
    store.set_setting(setting.key(), &parsed.to_string())?;
    println!("Set {key} = {parsed}");
    Ok(())
}

fn config_clear(store: &EntryStore, key: &str) -> error::Result<()> {
    let setting = Setting::from_key(key)?;
    if store.clear_setting(setting.key())? {
        println!(
            "Cleared {key} (default: {})",
            setting.default_value()
        );
    } else {
        println!("{key} was not set");
    }
    Ok(())
}

fn cmd_status(
    store: &EntryStore,
    data_dir: &DataDir,
    json: bool,
) -> error::Result<()> {
    let fixes = store.count(CollectionKind::Fixes)?;
    let guides = store.count(CollectionKind::Guides)?;
    let (tag_bonus, _) = settings::resolve(Setting::TagBonus, None, store)?;
    let (limit, _) = settings::resolve(Setting::Limit, None, store)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dataDir": data_dir.root().display().to_string(),
                "fixes": fixes,
                "guides": guides,
                "tagBonus": tag_bonus,
                "limit": limit,
            })
        );
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Quick fixes: {fixes}");
        println!("Quick guides: {guides}");
        println!("Tag bonus: {tag_bonus}");
        println!("Results per collection: {limit}");
    }
    Ok(())
}
