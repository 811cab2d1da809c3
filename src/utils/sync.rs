//! Diffing helpers for keeping a profile's child rows in line with an edited
//! target set without deleting and re-inserting everything.
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

use uuid::Uuid;

use crate::models::profilemodel::{Education, EducationEntry, Link, LinkPlatform, Skill};

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDiff<T> {
    pub to_insert: Vec<T>,
    pub to_delete: Vec<Uuid>,
}

impl<T> CollectionDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Multiset diff: a key that appears twice in `desired` needs two rows.
/// Rows already matching a desired item are left alone.
pub fn diff_by_key<R, T, K>(
    existing: &[R],
    desired: &[T],
    row_key: impl Fn(&R) -> K,
    item_key: impl Fn(&T) -> K,
    row_id: impl Fn(&R) -> Uuid,
) -> CollectionDiff<T>
where
    K: Eq + Hash,
    T: Clone,
{
    let mut wanted: HashMap<K, usize> = HashMap::new();
    for item in desired {
        *wanted.entry(item_key(item)).or_default() += 1;
    }

    let mut available: HashMap<K, usize> = HashMap::new();
    let mut to_delete = Vec::new();
    for row in existing {
        let key = row_key(row);
        match wanted.get_mut(&key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                *available.entry(key).or_default() += 1;
            }
            _ => to_delete.push(row_id(row)),
        }
    }

    let mut to_insert = Vec::new();
    for item in desired {
        match available.get_mut(&item_key(item)) {
            Some(count) if *count > 0 => *count -= 1,
            _ => to_insert.push(item.clone()),
        }
    }

    CollectionDiff { to_insert, to_delete }
}

pub fn diff_skills(existing: &[Skill], desired: &[String]) -> CollectionDiff<String> {
    diff_by_key(
        existing,
        desired,
        |row| row.skill.clone(),
        |item| item.clone(),
        |row| row.id,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationDiff {
    /// New rows with their list position.
    pub to_insert: Vec<(i32, EducationEntry)>,
    /// Kept rows whose position changed.
    pub to_reposition: Vec<(Uuid, i32)>,
    pub to_delete: Vec<Uuid>,
}

impl EducationDiff {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_reposition.is_empty() && self.to_delete.is_empty()
    }
}

/// Education is an ordered list: a desired entry reuses a matching row (in
/// stored order) and moves it to its index, anything unmatched is inserted
/// at its index, and leftover rows are deleted.
pub fn diff_education(existing: &[Education], desired: &[EducationEntry]) -> EducationDiff {
    let mut rows: Vec<&Education> = existing.iter().collect();
    rows.sort_by_key(|row| (row.position, row.created_at));

    let mut by_key: HashMap<(&str, &str, &str), VecDeque<&Education>> = HashMap::new();
    for row in rows {
        by_key
            .entry((row.degree.as_str(), row.institution.as_str(), row.year.as_str()))
            .or_default()
            .push_back(row);
    }

    let mut to_insert = Vec::new();
    let mut to_reposition = Vec::new();
    for (index, entry) in desired.iter().enumerate() {
        let position = index as i32;
        let matched = by_key
            .get_mut(&(entry.degree.as_str(), entry.institution.as_str(), entry.year.as_str()))
            .and_then(|queue| queue.pop_front());
        match matched {
            Some(row) if row.position != position => to_reposition.push((row.id, position)),
            Some(_) => {}
            None => to_insert.push((position, entry.clone())),
        }
    }

    let to_delete = by_key
        .into_values()
        .flatten()
        .map(|row| row.id)
        .collect();

    EducationDiff {
        to_insert,
        to_reposition,
        to_delete,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDiff {
    pub to_upsert: Vec<(LinkPlatform, String)>,
    pub to_delete: Vec<LinkPlatform>,
}

/// Links are keyed by platform: a changed url is an upsert, a platform absent
/// from `desired` is removed.
pub fn diff_links(existing: &[Link], desired: &BTreeMap<LinkPlatform, String>) -> LinkDiff {
    let current: BTreeMap<LinkPlatform, &str> = existing
        .iter()
        .map(|link| (link.platform, link.url.as_str()))
        .collect();

    let to_upsert = desired
        .iter()
        .filter(|(platform, url)| current.get(*platform) != Some(&url.as_str()))
        .map(|(platform, url)| (*platform, url.clone()))
        .collect();

    let to_delete = current
        .keys()
        .filter(|platform| !desired.contains_key(*platform))
        .copied()
        .collect();

    LinkDiff { to_upsert, to_delete }
}
