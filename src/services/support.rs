//! Help center requests.
//!
//! A request becomes an administrator notification. When the sender is signed
//! in they also get a confirmation in their own inbox. Both rows are written
//! in one transaction.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::notification::{self, NotificationKind};
use crate::error::AppResult;
use crate::services::notifications::NotificationHub;
use crate::utils::time::format_ist;
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportCategory {
    #[default]
    General,
    Booking,
    Payment,
    Technical,
    Feedback,
    Complaint,
}

impl SupportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportCategory::General => "general",
            SupportCategory::Booking => "booking",
            SupportCategory::Payment => "payment",
            SupportCategory::Technical => "technical",
            SupportCategory::Feedback => "feedback",
            SupportCategory::Complaint => "complaint",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl SupportPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportPriority::Low => "low",
            SupportPriority::Medium => "medium",
            SupportPriority::High => "high",
            SupportPriority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupportRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(
        custom = "validate_not_blank",
        length(max = 150, message = "Subject must be at most 150 characters")
    )]
    pub subject: String,
    #[serde(default)]
    pub category: SupportCategory,
    #[serde(default)]
    pub priority: SupportPriority,
    #[validate(custom = "validate_not_blank")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportOutcome {
    pub request: notification::Model,
    /// Present only when the request came from a signed-in user
    pub confirmation: Option<notification::Model>,
}

/// Files a support request on behalf of `sender` (if signed in).
pub async fn submit(
    db: &DatabaseConnection,
    hub: &NotificationHub,
    sender: Option<Uuid>,
    request: SupportRequest,
) -> AppResult<SupportOutcome> {
    request.validate()?;

    let now = Utc::now().fixed_offset();
    let txn = db.begin().await?;

    let admin_row = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        kind: Set(NotificationKind::Support),
        title: Set(format!("Support Request: {}", request.subject.trim())),
        message: Set(request_message(&request, &format_ist(now))),
        user_id: Set(None),
        booking_id: Set(None),
        is_read: Set(false),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let confirmation = match sender {
        Some(user_id) => Some(
            notification::ActiveModel {
                id: Set(Uuid::new_v4()),
                kind: Set(NotificationKind::System),
                title: Set("Support Request Submitted".to_string()),
                message: Set(confirmation_message(&request)),
                user_id: Set(Some(user_id)),
                booking_id: Set(None),
                is_read: Set(false),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?,
        ),
        None => None,
    };

    txn.commit().await?;

    tracing::info!(
        notification_id = %admin_row.id,
        category = request.category.as_str(),
        priority = request.priority.as_str(),
        signed_in = sender.is_some(),
        "Support request submitted"
    );
    hub.publish(admin_row.clone());

    Ok(SupportOutcome {
        request: admin_row,
        confirmation,
    })
}

fn request_message(request: &SupportRequest, submitted: &str) -> String {
    let phone = request
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Not provided");

    format!(
        "Support Request Details:\n\n\
         Customer: {}\n\
         Email: {}\n\
         Phone: {}\n\n\
         Category: {}\n\
         Priority: {}\n\
         Subject: {}\n\n\
         Message:\n{}\n\n\
         Submitted: {}",
        request.name.trim(),
        request.email.trim(),
        phone,
        request.category.as_str().to_uppercase(),
        request.priority.as_str().to_uppercase(),
        request.subject.trim(),
        request.message,
        submitted,
    )
}

fn confirmation_message(request: &SupportRequest) -> String {
    format!(
        "Your support request \"{}\" has been submitted successfully. \
         Our team will review it and respond within 24-48 hours.\n\n\
         Category: {}\n\
         Priority: {}",
        request.subject.trim(),
        request.category.as_str(),
        request.priority.as_str(),
    )
}
