//! Demo directory dataset.
//!
//! Three occupation roots with leaf children and five organizations spread
//! over Moscow, St Petersburg, Kazan and Nizhny Novgorod.

use crate::model::building::NewBuilding;
use crate::model::occupation::{NewOccupation, OccupationId};
use crate::model::phone_number::{NewPhoneNumber, PhoneNumberType};
use crate::repo::error::{RepoError, RepoResult};
use crate::seed::{
    insert_building, insert_occupation, insert_organization, insert_phone_number, link_occupation,
};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::collections::HashMap;

const OCCUPATION_FOREST: &[(&str, &[&str])] = &[
    ("Еда", &["Кофейни", "Рестораны", "Пекарни"]),
    ("Здоровье", &["Аптеки", "Клиники"]),
    ("Развлечения", &["Кинотеатры", "Музеи"]),
];

struct DemoPhone {
    value: &'static str,
    is_primary: bool,
    kind: PhoneNumberType,
    comment: Option<&'static str>,
}

struct DemoOrganization {
    name: &'static str,
    occupations: &'static [&'static str],
    address: &'static str,
    latitude: f64,
    longitude: f64,
    phones: &'static [DemoPhone],
}

const fn primary_work(value: &'static str) -> DemoPhone {
    DemoPhone {
        value,
        is_primary: true,
        kind: PhoneNumberType::Work,
        comment: None,
    }
}

const DEMO_ORGANIZATIONS: &[DemoOrganization] = &[
    DemoOrganization {
        name: "Кофемания Арбат",
        occupations: &["Кофейни"],
        address: "г. Москва, ул. Арбат, 18",
        latitude: 55.749709,
        longitude: 37.595149,
        phones: &[
            primary_work("+74951234567"),
            DemoPhone {
                value: "+79261234567",
                is_primary: false,
                kind: PhoneNumberType::Mobile,
                comment: Some("Доставка"),
            },
        ],
    },
    DemoOrganization {
        name: "Чайхана Пахлава",
        occupations: &["Рестораны"],
        address: "г. Москва, пр-т Мира, 26, стр. 1",
        latitude: 55.781164,
        longitude: 37.633091,
        phones: &[primary_work("+74956667788")],
    },
    DemoOrganization {
        name: "Городская клиника №1",
        occupations: &["Клиники"],
        address: "г. Санкт-Петербург, Невский пр., 44",
        latitude: 59.932087,
        longitude: 30.347661,
        phones: &[primary_work("+78124445566")],
    },
    DemoOrganization {
        name: "Аптека 36,6",
        occupations: &["Аптеки"],
        address: "г. Казань, ул. Баумана, 54",
        latitude: 55.794207,
        longitude: 49.107722,
        phones: &[primary_work("+78432998877")],
    },
    DemoOrganization {
        name: "Кулинария Хлеб да Соль",
        occupations: &["Пекарни"],
        address: "г. Нижний Новгород, ул. Большая Покровская, 21",
        latitude: 56.326797,
        longitude: 44.005986,
        phones: &[primary_work("+78312001122")],
    },
];

/// Result of a demo seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// Dataset was inserted.
    Seeded {
        organizations: usize,
        occupations: usize,
    },
    /// Organizations already existed; nothing was written.
    AlreadyPopulated,
}

/// Loads the demo dataset in one immediate transaction.
///
/// No-op when any organization already exists.
pub fn seed_demo_directory(conn: &Connection) -> RepoResult<SeedOutcome> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM organizations;", [], |row| {
        row.get(0)
    })?;
    if existing > 0 {
        info!("event=seed_demo module=seed status=skipped existing_organizations={existing}");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let occupation_ids = seed_occupations(&tx)?;
    for organization in DEMO_ORGANIZATIONS {
        seed_organization(&tx, organization, &occupation_ids)?;
    }
    tx.commit()?;

    let outcome = SeedOutcome::Seeded {
        organizations: DEMO_ORGANIZATIONS.len(),
        occupations: occupation_ids.len(),
    };
    info!(
        "event=seed_demo module=seed status=ok organizations={} occupations={}",
        DEMO_ORGANIZATIONS.len(),
        occupation_ids.len()
    );
    Ok(outcome)
}

fn seed_occupations(conn: &Connection) -> RepoResult<HashMap<&'static str, OccupationId>> {
    let mut ids = HashMap::new();
    for (root, children) in OCCUPATION_FOREST {
        let root_id = insert_occupation(conn, &NewOccupation::root(*root))?;
        ids.insert(*root, root_id);
        for child in children.iter() {
            let child_id = insert_occupation(conn, &NewOccupation::child(root_id, *child))?;
            ids.insert(*child, child_id);
        }
    }
    Ok(ids)
}

fn seed_organization(
    conn: &Connection,
    data: &DemoOrganization,
    occupation_ids: &HashMap<&'static str, OccupationId>,
) -> RepoResult<()> {
    let organization_id = insert_organization(conn, data.name)?;

    for name in data.occupations {
        let occupation_id = occupation_ids.get(name).copied().ok_or_else(|| {
            RepoError::InvalidData(format!("demo occupation `{name}` is not seeded"))
        })?;
        link_occupation(conn, organization_id, occupation_id)?;
    }

    insert_building(
        conn,
        &NewBuilding {
            address: data.address.to_string(),
            latitude: data.latitude,
            longitude: data.longitude,
            organization_id,
        },
    )?;

    for phone in data.phones {
        insert_phone_number(
            conn,
            &NewPhoneNumber {
                organization_id,
                value: phone.value.to_string(),
                is_primary: phone.is_primary,
                kind: phone.kind,
                comment: phone.comment.map(str::to_string),
            },
        )?;
    }
    Ok(())
}
