//! Household use-case service.
//!
//! # Responsibility
//! - Implement the init/show/update/batch-update/add-member/find-gaps
//!   operations on top of a [`DocumentStore`].
//! - Return structured reports; rendering is left to the caller.
//!
//! # Invariants
//! - A load failure prevents any mutation.
//! - A save happens at most once per operation, after all in-memory changes.
//! - Member ids stay unique strings: `add_member` rejects an existing id and
//!   updates may not store a taken or non-string `id`.

use crate::gaps::{scan_gaps, GapFilter};
use crate::model::household::{Document, Member, ID_FIELD};
use crate::path::{get_path, set_path, PATH_SEPARATOR};
use crate::store::{DocumentStore, StoreError};
use log::info;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from household service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence-layer failure.
    Store(StoreError),
    /// Requested member id does not exist.
    MemberNotFound { id: String, available: Vec<String> },
    /// `add_member` was called with an id that already exists.
    DuplicateMember(String),
    /// `batch_update` payload is not a JSON object.
    InvalidUpdatesPayload(String),
    /// An update would store a non-string member id.
    InvalidMemberId { field: String, value: Value },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::MemberNotFound { id, available } => {
                write!(f, "member '{id}' not found (available: {available:?})")
            }
            Self::DuplicateMember(id) => write!(f, "member '{id}' already exists"),
            Self::InvalidUpdatesPayload(details) => {
                write!(f, "invalid JSON object for updates: {details}")
            }
            Self::InvalidMemberId { field, value } => {
                write!(f, "member id must be a string; `{field}` would store {value}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::MemberNotFound { .. }
            | Self::DuplicateMember(_)
            | Self::InvalidUpdatesPayload(_)
            | Self::InvalidMemberId { .. } => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Template was copied to the data path.
    Created(PathBuf),
    /// Data file was already present; nothing was written.
    AlreadyExists(PathBuf),
}

/// Result of `show`.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowView {
    Document(Document),
    Member(Member),
}

/// One applied field assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    /// `None` when the path did not exist before the write.
    pub previous: Option<Value>,
    pub current: Value,
}

/// Result of `update` and `batch_update`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub member_id: String,
    pub changes: Vec<FieldChange>,
    pub saved_to: PathBuf,
}

/// Where a newly added member got its field shape from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberSeed {
    /// Template member with the same role.
    TemplateRole,
    /// First template member, with its role overwritten.
    TemplateFirst,
    /// No usable template: only `id` and `role`.
    Minimal,
}

/// Result of `add_member`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddMemberReport {
    pub member_id: String,
    pub role: String,
    pub seed: MemberSeed,
    pub saved_to: PathBuf,
}

/// Result of `find_gaps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapReport {
    pub member_id: String,
    pub gaps: Vec<String>,
    pub filter: Option<GapFilter>,
}

/// Parses `raw` as JSON when possible, otherwise keeps it as a plain string.
///
/// Note that `"null"`, `"42"` or `"true"` always coerce; storing those as
/// literal strings requires passing them JSON-quoted.
pub fn coerce_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Use-case service over the household document.
pub struct HouseholdService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> HouseholdService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Seeds the data file from the template unless it already exists.
    ///
    /// # Errors
    /// - `Store(TemplateMissing)` when no template file is found.
    pub fn init(&self) -> ServiceResult<InitOutcome> {
        let path = self.store.data_path().to_path_buf();
        if self.store.data_exists() {
            info!("event=init module=service status=skipped reason=exists");
            return Ok(InitOutcome::AlreadyExists(path));
        }

        let template = self.store.load_template()?;
        self.store.save(&template)?;
        info!(
            "event=init module=service status=ok members={}",
            template.members.len()
        );
        Ok(InitOutcome::Created(path))
    }

    /// Returns the whole document, or one member when `member_id` is given.
    pub fn show(&self, member_id: Option<&str>) -> ServiceResult<ShowView> {
        let document = self.store.load()?;
        match member_id {
            Some(id) => Ok(ShowView::Member(member_or_err(&document, id)?.clone())),
            None => Ok(ShowView::Document(document)),
        }
    }

    /// Sets one field from a raw CLI value, using [`coerce_value`].
    pub fn update(&self, member_id: &str, field: &str, raw_value: &str) -> ServiceResult<UpdateReport> {
        let mut updates = Map::new();
        updates.insert(field.to_string(), coerce_value(raw_value));
        self.apply_updates(member_id, &updates)
    }

    /// Applies a JSON object of `field: value` pairs in object order.
    ///
    /// # Errors
    /// - `MemberNotFound` is checked before the payload is parsed.
    /// - `InvalidUpdatesPayload` when `updates_json` is not a JSON object.
    pub fn batch_update(&self, member_id: &str, updates_json: &str) -> ServiceResult<UpdateReport> {
        let mut document = self.store.load()?;
        member_or_err(&document, member_id)?;
        let updates = parse_updates(updates_json)?;
        self.apply_and_save(&mut document, member_id, &updates)
    }

    /// Applies already-parsed updates to one member and persists once.
    pub fn apply_updates(
        &self,
        member_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<UpdateReport> {
        let mut document = self.store.load()?;
        self.apply_and_save(&mut document, member_id, updates)
    }

    /// Appends a new member shaped after the template member for `role`.
    pub fn add_member(&self, member_id: &str, role: &str) -> ServiceResult<AddMemberReport> {
        let mut document = self.store.load()?;
        if document.contains_member(member_id) {
            return Err(ServiceError::DuplicateMember(member_id.to_string()));
        }

        let template = match self.store.load_template() {
            Ok(template) => Some(template),
            Err(StoreError::TemplateMissing(_)) => None,
            Err(err) => return Err(err.into()),
        };
        let (mut member, seed) = seed_member(template.as_ref(), member_id, role);
        member.set_id(member_id);
        document.members.push(member);

        self.store.save(&document)?;
        info!(
            "event=member_add module=service status=ok seed={:?} members={}",
            seed,
            document.members.len()
        );
        Ok(AddMemberReport {
            member_id: member_id.to_string(),
            role: role.to_string(),
            seed,
            saved_to: self.store.data_path().to_path_buf(),
        })
    }

    /// Lists null fields of one member, optionally narrowed by `filter`.
    pub fn find_gaps(&self, member_id: &str, filter: Option<GapFilter>) -> ServiceResult<GapReport> {
        let document = self.store.load()?;
        let member = member_or_err(&document, member_id)?;

        let filter = filter.filter(|filter| !filter.is_empty());
        let mut gaps = scan_gaps(member.fields());
        if let Some(filter) = &filter {
            gaps = filter.apply(gaps);
        }
        info!(
            "event=find_gaps module=service status=ok gaps={} filtered={}",
            gaps.len(),
            filter.is_some()
        );
        Ok(GapReport {
            member_id: member_id.to_string(),
            gaps,
            filter,
        })
    }

    fn apply_and_save(
        &self,
        document: &mut Document,
        member_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<UpdateReport> {
        member_or_err(document, member_id)?;
        for (field, value) in updates {
            check_id_change(document, member_id, field, value)?;
        }
        let Some(member) = document.find_member_mut(member_id) else {
            return Err(ServiceError::MemberNotFound {
                id: member_id.to_string(),
                available: Vec::new(),
            });
        };

        let changes = updates
            .iter()
            .map(|(field, value)| {
                let previous = get_path(member.fields(), field).cloned();
                set_path(member.fields_mut(), field, value.clone());
                FieldChange {
                    field: field.clone(),
                    previous,
                    current: value.clone(),
                }
            })
            .collect::<Vec<_>>();

        self.store.save(document)?;
        info!(
            "event=member_update module=service status=ok fields={}",
            changes.len()
        );
        Ok(UpdateReport {
            member_id: member_id.to_string(),
            changes,
            saved_to: self.store.data_path().to_path_buf(),
        })
    }
}

fn member_or_err<'a>(document: &'a Document, id: &str) -> ServiceResult<&'a Member> {
    document
        .find_member(id)
        .ok_or_else(|| ServiceError::MemberNotFound {
            id: id.to_string(),
            available: document.member_ids(),
        })
}

/// Rejects updates that would leave a member without a unique string id.
fn check_id_change(
    document: &Document,
    member_id: &str,
    field: &str,
    value: &Value,
) -> ServiceResult<()> {
    let targets_id = field == ID_FIELD
        || field
            .strip_prefix(ID_FIELD)
            .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR));
    if !targets_id {
        return Ok(());
    }

    match value {
        Value::String(new_id) if field == ID_FIELD => {
            if new_id != member_id && document.contains_member(new_id) {
                return Err(ServiceError::DuplicateMember(new_id.clone()));
            }
            Ok(())
        }
        _ => Err(ServiceError::InvalidMemberId {
            field: field.to_string(),
            value: value.clone(),
        }),
    }
}

fn parse_updates(raw: &str) -> ServiceResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ServiceError::InvalidUpdatesPayload(format!(
            "expected an object, got {}",
            value_kind(&other)
        ))),
        Err(err) => Err(ServiceError::InvalidUpdatesPayload(err.to_string())),
    }
}

fn seed_member(template: Option<&Document>, member_id: &str, role: &str) -> (Member, MemberSeed) {
    let Some(template) = template else {
        return (Member::minimal(member_id, role), MemberSeed::Minimal);
    };
    if let Some(matching) = template.find_by_role(role) {
        return (matching.clone(), MemberSeed::TemplateRole);
    }
    match template.members.first() {
        Some(first) => {
            let mut member = first.clone();
            member.set_role(role);
            (member, MemberSeed::TemplateFirst)
        }
        None => (Member::minimal(member_id, role), MemberSeed::Minimal),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
