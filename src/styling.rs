//! Variant tables for the design-system badges and buttons.
//!
//! Each table is an exhaustive match over a closed enum, so adding a status
//! without a style is a compile error. Free-form priority strings coming off
//! the wire map onto `Priority::Unknown`, which has its own neutral style.

use serde::Serialize;

use crate::types::DealStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Success,
    Warning,
    Destructive,
    Outline,
}

impl BadgeVariant {
    pub fn class_name(&self) -> &'static str {
        match self {
            BadgeVariant::Default => "bg-primary text-primary-foreground",
            BadgeVariant::Secondary => "bg-secondary text-secondary-foreground",
            BadgeVariant::Success => "bg-emerald-500/15 text-emerald-600",
            BadgeVariant::Warning => "bg-amber-500/15 text-amber-600",
            BadgeVariant::Destructive => "bg-destructive text-destructive-foreground",
            BadgeVariant::Outline => "border text-foreground",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Default,
    Destructive,
    Outline,
    Secondary,
    Ghost,
    Link,
}

impl ButtonVariant {
    pub fn class_name(&self) -> &'static str {
        match self {
            ButtonVariant::Default => "bg-primary text-primary-foreground hover:bg-primary/90",
            ButtonVariant::Destructive => {
                "bg-destructive text-destructive-foreground hover:bg-destructive/90"
            }
            ButtonVariant::Outline => "border border-input bg-background hover:bg-accent",
            ButtonVariant::Secondary => "bg-secondary text-secondary-foreground hover:bg-secondary/80",
            ButtonVariant::Ghost => "hover:bg-accent hover:text-accent-foreground",
            ButtonVariant::Link => "text-primary underline-offset-4 hover:underline",
        }
    }
}

pub fn status_badge(status: DealStatus) -> BadgeVariant {
    match status {
        DealStatus::Follow => BadgeVariant::Secondary,
        DealStatus::DueDiligence => BadgeVariant::Warning,
        DealStatus::Invested => BadgeVariant::Success,
        DealStatus::Pass => BadgeVariant::Outline,
        DealStatus::Reject => BadgeVariant::Destructive,
        DealStatus::Unknown => BadgeVariant::Outline,
    }
}

/// i18n key for a status label.
pub fn status_label_key(status: DealStatus) -> &'static str {
    match status {
        DealStatus::Follow => "status.follow",
        DealStatus::DueDiligence => "status.due_diligence",
        DealStatus::Invested => "status.invested",
        DealStatus::Pass => "status.pass",
        DealStatus::Reject => "status.reject",
        DealStatus::Unknown => "status.unknown",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
    Unknown,
}

impl Priority {
    pub fn parse(s: &str) -> Priority {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "urgent" => Priority::High,
            "medium" | "normal" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unknown,
        }
    }
}

pub fn priority_badge(priority: Priority) -> BadgeVariant {
    match priority {
        Priority::High => BadgeVariant::Destructive,
        Priority::Medium => BadgeVariant::Warning,
        Priority::Low => BadgeVariant::Secondary,
        Priority::Unknown => BadgeVariant::Outline,
    }
}

/// Badge for a stock move: green up, red down, neutral when flat.
pub fn change_badge(change_percent: f64) -> BadgeVariant {
    if change_percent > 0.0 {
        BadgeVariant::Success
    } else if change_percent < 0.0 {
        BadgeVariant::Destructive
    } else {
        BadgeVariant::Secondary
    }
}
