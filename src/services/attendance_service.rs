use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};

use crate::database::MongoDB;
use crate::models::{Attendance, AuthUser};
use crate::utils::error::{is_duplicate_key_error, AppError};

const COLLECTION: &str = "attendance";

/// Local midnight for the given instant, as the stored day marker. The day
/// boundary is process-local; callers in other time zones are not
/// reconciled.
pub(crate) fn day_start(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        None => DateTime::from_naive_utc_and_offset(midnight, Utc),
    }
}

/// Per-user per-day state machine, check-in side:
/// NoRecord -> CheckedIn; CheckedIn and CheckedOut both refuse.
pub(crate) fn validate_check_in(today_record: Option<&Attendance>) -> Result<(), AppError> {
    match today_record {
        Some(record) if record.check_out.is_none() => Err(AppError::Validation(
            "Already checked in today".to_string(),
        )),
        Some(_) => Err(AppError::Validation(
            "Attendance for today is already completed".to_string(),
        )),
        None => Ok(()),
    }
}

/// Check-out side: CheckedIn -> CheckedOut; NoRecord and CheckedOut refuse.
pub(crate) fn validate_check_out(today_record: Option<&Attendance>) -> Result<(), AppError> {
    match today_record {
        None => Err(AppError::Validation(
            "You haven't checked in today".to_string(),
        )),
        Some(record) if record.check_out.is_some() => Err(AppError::Validation(
            "Already checked out today".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

pub async fn check_in(db: &MongoDB, caller: &AuthUser) -> Result<(), AppError> {
    let today = BsonDateTime::from_chrono(day_start(Local::now()));
    let collection = db.collection::<Attendance>(COLLECTION);

    let today_record = collection
        .find_one(doc! { "user": caller.id, "date": today })
        .await?;

    validate_check_in(today_record.as_ref())?;

    let record = Attendance {
        id: None,
        user: caller.id,
        check_in: Some(BsonDateTime::now()),
        check_out: None,
        date: today,
    };

    // The unique (user, date) index turns a lost race between two
    // simultaneous check-ins into a duplicate-key error here
    match collection.insert_one(&record).await {
        Ok(_) => {
            log::info!("✅ Check-in: {}", caller.email);
            Ok(())
        }
        Err(e) if is_duplicate_key_error(&e) => Err(AppError::Validation(
            "Already checked in today".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn check_out(db: &MongoDB, caller: &AuthUser) -> Result<(), AppError> {
    let today = BsonDateTime::from_chrono(day_start(Local::now()));
    let collection = db.collection::<Attendance>(COLLECTION);

    let today_record = collection
        .find_one(doc! { "user": caller.id, "date": today })
        .await?;

    validate_check_out(today_record.as_ref())?;

    collection
        .update_one(
            doc! { "user": caller.id, "date": today },
            doc! { "$set": { "check_out": BsonDateTime::now() } },
        )
        .await?;

    log::info!("✅ Check-out: {}", caller.email);
    Ok(())
}
