//! `orgspace` command-line probe over the core entity store.

mod cli;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, EntityFields};
use log::info;
use orgspace_core::db::open_db;
use orgspace_core::{
    init_logging_from_config, load_config, progress, Entity, EntityDraft, EntityFilters,
    EntityStore, KeyValueStorage, RawChecklistItem, SqliteKeyValueStorage, View,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Ping = command {
        println!("orgspace_core ping={}", orgspace_core::ping());
        println!("orgspace_core version={}", orgspace_core::core_version());
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    init_logging_from_config(&config)?;
    let conn = open_db(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    let mut store = EntityStore::open(SqliteKeyValueStorage::try_new(&conn)?);

    run(command, &mut store)
}

fn run<S: KeyValueStorage>(command: Commands, store: &mut EntityStore<S>) -> Result<()> {
    match command {
        Commands::Ping => {}
        Commands::List {
            view,
            status,
            priority,
            search,
        } => {
            let Some(view) = View::parse(&view) else {
                bail!("unknown view `{view}`");
            };
            let filters = EntityFilters::new()
                .with_status(status)
                .with_priority(priority)
                .with_search(search);
            let visible = store.query(view, &filters);

            println!("{} ({})", view.title(), visible.len());
            for entity in visible {
                println!("{}", summary_line(entity));
            }
        }
        Commands::Stats => {
            let stats = store.stats();
            println!("active_projects={}", stats.active_projects);
            println!("active_tasks={}", stats.active_tasks);
            println!("completion_rate={}%", stats.completion_rate);
        }
        Commands::Add {
            title,
            kind,
            fields,
        } => {
            let mut draft = EntityDraft {
                kind,
                title,
                ..EntityDraft::default()
            };
            apply_fields(&mut draft, fields);
            let entity = draft.into_entity(None)?;
            let created = store.upsert(entity).into_entity();
            println!("created {} {}", created.kind, created.id);
        }
        Commands::Edit {
            id,
            title,
            kind,
            fields,
        } => {
            let Some(existing) = store.get(&id).cloned() else {
                bail!("no entity with id `{id}`");
            };
            let mut draft = EntityDraft::from_entity(&existing);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(kind) = kind {
                draft.kind = kind;
            }
            apply_fields(&mut draft, fields);
            let entity = draft.into_entity(Some(&existing))?;
            let updated = store.upsert(entity).into_entity();
            println!("updated {} {}", updated.kind, updated.id);
        }
        Commands::ToggleItem { id, position } => {
            let Some(entity) = store.get(&id) else {
                bail!("no entity with id `{id}`");
            };
            if position == 0 || position > entity.checklist.len() {
                bail!(
                    "position {position} is out of range; entity has {} items",
                    entity.checklist.len()
                );
            }
            let rows = entity
                .checklist
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let mut row = RawChecklistItem::from(item);
                    if index + 1 == position {
                        row.completed = !row.completed;
                    }
                    row
                })
                .collect::<Vec<_>>();
            if let Some(entity) = store.replace_checklist(&id, rows) {
                let done = progress(&entity.checklist);
                println!(
                    "checklist {}/{} ({}%)",
                    done.completed, done.total, done.percent
                );
            }
        }
        Commands::Show { id } => {
            let Some(entity) = store.get(&id) else {
                bail!("no entity with id `{id}`");
            };
            print_entity(entity);
        }
        Commands::Remove { id } => match store.remove(&id) {
            Some(removed) => println!("removed {} {}", removed.kind, removed.id),
            None => println!("nothing to remove for `{id}`"),
        },
        Commands::ResetChecklist { id } => {
            let Some(entity) = store.get(&id) else {
                bail!("no entity with id `{id}`");
            };
            if !entity.kind.supports_checklist_reset() {
                bail!("entity `{id}` is a {}, not a checklist", entity.kind);
            }
            if let Some(entity) = store.reset_checklist(&id) {
                let done = progress(&entity.checklist);
                println!("reset {} items", done.total);
            }
        }
        Commands::Export { dir } => {
            let snapshot = store.export_snapshot();
            let path = dir.join(snapshot.file_name());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            std::fs::write(&path, snapshot.to_json()?)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(
                "event=store_export module=cli status=ok entities={}",
                snapshot.entities.len()
            );
            println!(
                "exported {} entities to {}",
                snapshot.entities.len(),
                path.display()
            );
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            match store.import_json(&text) {
                Ok(count) => println!("imported {count} entities"),
                Err(err) => bail!("{}", err.user_message()),
            }
        }
    }
    Ok(())
}

fn apply_fields(draft: &mut EntityDraft, fields: EntityFields) {
    let EntityFields {
        description,
        status,
        priority,
        due_date,
        color,
        tags,
        items,
    } = fields;
    if let Some(description) = description {
        draft.description = description;
    }
    if let Some(status) = status {
        draft.status = status;
    }
    if let Some(priority) = priority {
        draft.priority = priority;
    }
    if let Some(due_date) = due_date {
        draft.due_date = due_date;
    }
    if let Some(color) = color {
        draft.color = color;
    }
    if let Some(tags) = tags {
        draft.tags = tags;
    }
    if !items.is_empty() {
        draft.checklist = items
            .into_iter()
            .map(|text| RawChecklistItem::new(text, false))
            .collect();
    }
}

fn summary_line(entity: &Entity) -> String {
    let mut line = format!(
        "{}  [{}] {}  status={} priority={}",
        entity.id, entity.kind, entity.title, entity.status, entity.priority
    );
    if let Some(due) = entity.due_date {
        line.push_str(&format!(" due={due}"));
    }
    if !entity.checklist.is_empty() {
        let done = progress(&entity.checklist);
        line.push_str(&format!(" checklist={}/{}", done.completed, done.total));
    }
    line
}

fn print_entity(entity: &Entity) {
    println!("id:          {}", entity.id);
    println!("type:        {}", entity.kind);
    println!("title:       {}", entity.title);
    if let Some(description) = &entity.description {
        println!("description: {description}");
    }
    println!("status:      {}", entity.status);
    println!("priority:    {}", entity.priority);
    println!("color:       {}", entity.color);
    if !entity.tags.is_empty() {
        println!("tags:        {}", entity.tags.join(", "));
    }
    println!(
        "created:     {}",
        entity.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(updated_at) = entity.updated_at {
        println!("updated:     {}", updated_at.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(due) = entity.due_date {
        println!("due:         {due}");
    }
    if !entity.checklist.is_empty() {
        let done = progress(&entity.checklist);
        println!(
            "checklist:   {}/{} ({}%)",
            done.completed, done.total, done.percent
        );
        for item in &entity.checklist {
            let mark = if item.completed { 'x' } else { ' ' };
            println!("  [{mark}] {}", item.text);
        }
    }
}
