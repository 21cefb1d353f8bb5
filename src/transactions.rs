//! Mutating operations on the tracking sheet.
//!
//! Each transaction edits a copy of the store's cached table and commits
//! it with a full save. The cache only changes once the save succeeds.
//! Outcomes that leave the table untouched (no matching record, blank
//! pathway name) are reported as values rather than errors, and skip the
//! save.

use serde::Serialize;

use crate::models::{TaskKey, TaskRecord, TaskStatus};
use crate::storage::TableStore;
use crate::{Error, Result};

/// Result of a status/note edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    /// Every record with the triple was updated and the sheet saved.
    Updated { key: TaskKey, matched: usize },
    /// No record has the triple; nothing changed.
    NoMatch { key: TaskKey },
}

/// Result of creating a pathway from the template pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AppendOutcome {
    /// Records were appended (possibly zero, for an empty table) and the sheet saved.
    Appended { pathway: String, added: usize },
    /// The name was empty after trimming; nothing changed.
    EmptyName,
}

/// Set the status, and the note, of every record matching `key`.
///
/// Marking a task done always clears its note, whatever `note` says.
/// Only the four assignable statuses are accepted.
pub fn edit_status(
    store: &mut TableStore,
    key: &TaskKey,
    status: TaskStatus,
    note: Option<&str>,
) -> Result<EditOutcome> {
    if let TaskStatus::Other(raw) = &status {
        return Err(Error::InvalidInput(format!("Unknown status: {}", raw)));
    }

    let mut table = store.load()?.clone();
    let indices = table.find(key);
    if indices.is_empty() {
        tracing::info!(%key, "edit matched no record");
        return Ok(EditOutcome::NoMatch { key: key.clone() });
    }
    if indices.len() > 1 {
        tracing::warn!(%key, matched = indices.len(), "duplicate records share one triple");
    }

    let note = if status == TaskStatus::Done {
        String::new()
    } else {
        note.unwrap_or_default().to_string()
    };
    let records = table.records_mut();
    for i in &indices {
        records[*i].set_status(status.clone());
        records[*i].note = note.clone();
    }

    store.commit(table)?;
    tracing::info!(%key, %status, matched = indices.len(), "updated task status");
    Ok(EditOutcome::Updated {
        key: key.clone(),
        matched: indices.len(),
    })
}

/// Create a pathway by cloning every distinct (phase, task) pair in the table.
///
/// The template spans all existing pathways, not one of them, so pathways
/// with different layouts contribute the union of their pairs.
pub fn append_pathway(store: &mut TableStore, name: &str) -> Result<AppendOutcome> {
    let name = name.trim();
    if name.is_empty() {
        tracing::info!("ignoring pathway with blank name");
        return Ok(AppendOutcome::EmptyName);
    }

    let mut table = store.load()?.clone();
    let template = table.template_pairs();
    let added = template.len();
    for (phase, task) in template {
        table.push(TaskRecord::new(name, phase, task));
    }

    store.commit(table)?;
    tracing::info!(pathway = name, added, "appended pathway");
    Ok(AppendOutcome::Appended {
        pathway: name.to_string(),
        added,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    const TEMPLATE_CSV: &str = "\
pathway,phase,task,status,note
X,A,1,Done,
X,A,2,Pending,
X,B,1,Pending,
Y,A,1,In Progress,call back
";

    #[test]
    fn test_edit_each_status_is_persisted() {
        let env = TestEnv::new();
        let key = TaskKey::new("Cardiologia", "B", "1");

        for status in TaskStatus::ASSIGNABLE {
            let mut store = env.open_store();
            let outcome = edit_status(&mut store, &key, status.clone(), Some("n")).unwrap();
            assert_eq!(
                outcome,
                EditOutcome::Updated {
                    key: key.clone(),
                    matched: 1
                }
            );

            let mut reread = env.open_store();
            let table = reread.load().unwrap();
            let idx = table.find(&key)[0];
            assert_eq!(table.records()[idx].status, status);
        }
    }

    #[test]
    fn test_edit_done_clears_note() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let key = TaskKey::new("Cardiologia", "B", "2");

        edit_status(&mut store, &key, TaskStatus::Done, Some("should vanish")).unwrap();

        let mut reread = env.open_store();
        let table = reread.load().unwrap();
        let record = &table.records()[table.find(&key)[0]];
        assert_eq!(record.status, TaskStatus::Done);
        assert_eq!(record.note, "");
    }

    #[test]
    fn test_edit_keeps_note_for_other_statuses() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let key = TaskKey::new("Diabetes", "A", "1");

        edit_status(&mut store, &key, TaskStatus::InProgress, Some("scheduled")).unwrap();
        let table = store.load().unwrap();
        assert_eq!(table.records()[table.find(&key)[0]].note, "scheduled");

        edit_status(&mut store, &key, TaskStatus::Pending, None).unwrap();
        let table = store.load().unwrap();
        assert_eq!(table.records()[table.find(&key)[0]].note, "");
    }

    #[test]
    fn test_edit_no_match_leaves_table_and_file_untouched() {
        let env = TestEnv::new();
        let before = std::fs::read(env.path()).unwrap();
        let mut store = env.open_store();
        let snapshot = store.load().unwrap().clone();

        let key = TaskKey::new("Cardiologia", "A", "404");
        let outcome = edit_status(&mut store, &key, TaskStatus::Done, None).unwrap();

        assert_eq!(outcome, EditOutcome::NoMatch { key });
        assert_eq!(store.load().unwrap(), &snapshot);
        assert_eq!(std::fs::read(env.path()).unwrap(), before);
    }

    #[test]
    fn test_edit_rejects_unassignable_status() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let key = TaskKey::new("Cardiologia", "A", "1");
        let result = edit_status(&mut store, &key, TaskStatus::Other("Later".into()), None);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_edit_updates_every_duplicate() {
        let env = TestEnv::with_csv(
            "pathway,phase,task,status,note\nX,A,1,Pending,\nX,A,1,Pending,\n",
        );
        let mut store = env.open_store();
        let key = TaskKey::new("X", "A", "1");
        let outcome = edit_status(&mut store, &key, TaskStatus::Ongoing, Some("n")).unwrap();

        assert_eq!(outcome, EditOutcome::Updated { key, matched: 2 });
        assert!(
            store
                .load()
                .unwrap()
                .records()
                .iter()
                .all(|r| r.status == TaskStatus::Ongoing)
        );
    }

    #[test]
    fn test_unedited_status_cells_are_written_back_verbatim() {
        let env = TestEnv::with_csv(
            " Linha de Cuidado ,Fase,Tarefa,Status,Observações\n\
             X,A,1,concluido,\n\
             X,A,2,Done,\n\
             X,B,1,Pendente,\n",
        );
        let mut store = env.open_store();
        let key = TaskKey::new("X", "B", "1");
        edit_status(&mut store, &key, TaskStatus::Done, None).unwrap();

        assert_eq!(
            std::fs::read_to_string(env.path()).unwrap(),
            " Linha de Cuidado ,Fase,Tarefa,Status,Observações\n\
             X,A,1,concluido,\n\
             X,A,2,Done,\n\
             X,B,1,Concluído,\n"
        );
    }

    #[test]
    fn test_failed_save_leaves_cached_table_unchanged() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        store.load().unwrap();
        std::fs::remove_dir_all(env.dir.path()).unwrap();

        let key = TaskKey::new("Diabetes", "A", "1");
        let result = edit_status(&mut store, &key, TaskStatus::Done, Some("x"));
        assert!(matches!(result, Err(Error::Io(_))));
        let table = store.load().unwrap();
        let record = &table.records()[table.find(&key)[0]];
        assert_eq!(record.status, TaskStatus::Pending);
        assert_eq!(record.note, "");

        assert!(matches!(
            append_pathway(&mut store, "Oncologia"),
            Err(Error::Io(_))
        ));
        assert_eq!(store.load().unwrap().len(), 6);
        assert_eq!(store.load().unwrap().pathways(), vec!["Cardiologia", "Diabetes"]);
    }

    #[test]
    fn test_append_clones_distinct_pairs() {
        let env = TestEnv::with_csv(TEMPLATE_CSV);
        let mut store = env.open_store();

        let outcome = append_pathway(&mut store, "Oncologia").unwrap();
        assert_eq!(
            outcome,
            AppendOutcome::Appended {
                pathway: "Oncologia".to_string(),
                added: 3
            }
        );

        let mut reread = env.open_store();
        let table = reread.load().unwrap();
        assert_eq!(table.len(), 7);
        let added: Vec<_> = table
            .records()
            .iter()
            .filter(|r| r.pathway == "Oncologia")
            .collect();
        assert_eq!(added.len(), 3);
        assert!(added.iter().all(|r| r.status == TaskStatus::Pending));
        assert!(added.iter().all(|r| r.note.is_empty()));
        let pairs: Vec<_> = added
            .iter()
            .map(|r| (r.phase.as_str(), r.task.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "1"), ("A", "2"), ("B", "1")]);
    }

    #[test]
    fn test_append_trims_name() {
        let env = TestEnv::with_csv(TEMPLATE_CSV);
        let mut store = env.open_store();
        append_pathway(&mut store, "  Oncologia \t").unwrap();
        assert_eq!(store.load().unwrap().pathways(), vec!["X", "Y", "Oncologia"]);
    }

    #[test]
    fn test_append_blank_name_is_noop() {
        let env = TestEnv::with_csv(TEMPLATE_CSV);
        let mut store = env.open_store();

        for name in ["", "   ", "\t\n"] {
            assert_eq!(
                append_pathway(&mut store, name).unwrap(),
                AppendOutcome::EmptyName
            );
        }
        assert_eq!(store.load().unwrap().len(), 4);
    }

    #[test]
    fn test_append_to_empty_table_adds_nothing() {
        let env = TestEnv::with_csv("pathway,phase,task,status,note\n");
        let mut store = env.open_store();
        let outcome = append_pathway(&mut store, "New").unwrap();
        assert_eq!(
            outcome,
            AppendOutcome::Appended {
                pathway: "New".to_string(),
                added: 0
            }
        );
        assert!(store.load().unwrap().is_empty());
    }
}
