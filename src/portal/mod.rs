pub mod commands;
pub mod layout;
pub mod views;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown {kind}: {value}")]
pub struct ParseFixtureError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketCategory {
    Safety,
    Benefits,
    Schedule,
    Workplace,
    Harassment,
    Other,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 6] = [
        TicketCategory::Safety,
        TicketCategory::Benefits,
        TicketCategory::Schedule,
        TicketCategory::Workplace,
        TicketCategory::Harassment,
        TicketCategory::Other,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            TicketCategory::Safety => "safety",
            TicketCategory::Benefits => "benefits",
            TicketCategory::Schedule => "schedule",
            TicketCategory::Workplace => "workplace",
            TicketCategory::Harassment => "harassment",
            TicketCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketCategory::Safety => "Safety",
            TicketCategory::Benefits => "Benefits",
            TicketCategory::Schedule => "Schedule",
            TicketCategory::Workplace => "Workplace Issues",
            TicketCategory::Harassment => "Harassment",
            TicketCategory::Other => "Other",
        }
    }
}

impl FromStr for TicketCategory {
    type Err = ParseFixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketCategory::ALL
            .into_iter()
            .find(|c| c.value() == s.trim())
            .ok_or_else(|| ParseFixtureError {
                kind: "ticket category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Urgent => "Urgent",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            TicketPriority::Urgent | TicketPriority::High => "bg-red-100 text-red-800",
            TicketPriority::Medium => "bg-yellow-100 text-yellow-800",
            TicketPriority::Low => "bg-green-100 text-green-800",
        }
    }

    /// Left border used on announcement cards.
    pub fn border_class(&self) -> &'static str {
        match self {
            TicketPriority::Urgent | TicketPriority::High => "border-l-4 border-l-red-500",
            TicketPriority::Medium => "border-l-4 border-l-yellow-500",
            TicketPriority::Low => "border-l-4 border-l-green-500",
        }
    }
}

impl FromStr for TicketPriority {
    type Err = ParseFixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketPriority::ALL
            .into_iter()
            .find(|p| p.value() == s.trim())
            .ok_or_else(|| ParseFixtureError {
                kind: "ticket priority",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl TicketStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "Pending",
            TicketStatus::UnderReview => "Under Review",
            TicketStatus::Approved => "Approved",
            TicketStatus::Rejected => "Rejected",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            TicketStatus::Approved => "bg-green-100 text-green-800",
            TicketStatus::UnderReview => "bg-yellow-100 text-yellow-800",
            TicketStatus::Pending => "bg-blue-100 text-blue-800",
            TicketStatus::Rejected => "bg-red-100 text-red-800",
        }
    }
}

pub struct Ticket {
    pub id: &'static str,
    pub title: &'static str,
    pub category: TicketCategory,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub date: &'static str,
    pub description: &'static str,
}

impl Ticket {
    fn matches(&self, needle: &str) -> bool {
        [
            self.id,
            self.title,
            self.description,
            self.category.label(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

pub const TICKETS: &[Ticket] = &[
    Ticket {
        id: "1234",
        title: "Workplace Safety Concern",
        category: TicketCategory::Safety,
        status: TicketStatus::UnderReview,
        priority: TicketPriority::High,
        date: "2024-01-15",
        description: "Unsafe working conditions in the factory floor",
    },
    Ticket {
        id: "1235",
        title: "Schedule Change Request",
        category: TicketCategory::Schedule,
        status: TicketStatus::Approved,
        priority: TicketPriority::Medium,
        date: "2024-01-10",
        description: "Request for shift change due to family circumstances",
    },
    Ticket {
        id: "1236",
        title: "Benefits Inquiry",
        category: TicketCategory::Benefits,
        status: TicketStatus::Pending,
        priority: TicketPriority::Low,
        date: "2024-01-08",
        description: "Questions about healthcare coverage options",
    },
];

/// Case-insensitive match over id, title, description and category.
/// A blank query returns every ticket.
pub fn search_tickets(query: &str) -> Vec<&'static Ticket> {
    let needle = query.trim().to_lowercase();
    TICKETS.iter().filter(|t| t.matches(&needle)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementCategory {
    Agreement,
    Meeting,
    Training,
    Schedule,
}

impl AnnouncementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AnnouncementCategory::Agreement => "Agreement",
            AnnouncementCategory::Meeting => "Meeting",
            AnnouncementCategory::Training => "Training",
            AnnouncementCategory::Schedule => "Schedule",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            AnnouncementCategory::Agreement => "bg-indigo-600 text-white",
            AnnouncementCategory::Meeting => "bg-indigo-100 text-indigo-800",
            AnnouncementCategory::Training => "bg-amber-100 text-amber-800",
            AnnouncementCategory::Schedule => "bg-gray-100 text-gray-700",
        }
    }
}

pub struct Announcement {
    pub id: u32,
    pub title: &'static str,
    /// May carry the safe formatting subset of HTML.
    pub content: &'static str,
    pub category: AnnouncementCategory,
    pub date: &'static str,
    pub priority: TicketPriority,
    pub author: &'static str,
}

pub const ANNOUNCEMENTS: &[Announcement] = &[
    Announcement {
        id: 1,
        title: "New Union Agreement Signed",
        content: "We're pleased to announce that a new collective bargaining agreement has been reached, providing <strong>improved benefits</strong> and working conditions for all members.",
        category: AnnouncementCategory::Agreement,
        date: "2024-01-15",
        priority: TicketPriority::High,
        author: "Union Leadership",
    },
    Announcement {
        id: 2,
        title: "Monthly Union Meeting",
        content: "Join us for our monthly union meeting this Thursday at 6 PM in the main hall. We'll discuss recent developments and upcoming initiatives.",
        category: AnnouncementCategory::Meeting,
        date: "2024-01-12",
        priority: TicketPriority::Medium,
        author: "Events Committee",
    },
    Announcement {
        id: 3,
        title: "Health & Safety Training",
        content: "<em>Mandatory</em> health and safety training sessions will be conducted next week. Please check your schedule and attend your assigned session.",
        category: AnnouncementCategory::Training,
        date: "2024-01-10",
        priority: TicketPriority::High,
        author: "Safety Committee",
    },
    Announcement {
        id: 4,
        title: "Holiday Schedule Update",
        content: "Please note the updated holiday schedule for the upcoming quarter. Check the member portal for detailed information.",
        category: AnnouncementCategory::Schedule,
        date: "2024-01-08",
        priority: TicketPriority::Low,
        author: "HR Department",
    },
];

pub fn featured_announcement() -> &'static Announcement {
    &ANNOUNCEMENTS[0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "bg-green-100 text-green-800",
            PaymentStatus::Pending => "bg-yellow-100 text-yellow-800",
            PaymentStatus::Failed => "bg-red-100 text-red-800",
        }
    }
}

pub struct Payment {
    pub id: &'static str,
    pub description: &'static str,
    pub amount_cents: u32,
    pub date: &'static str,
    pub status: PaymentStatus,
    pub method: &'static str,
}

impl Payment {
    pub fn amount(&self) -> String {
        format_cents(self.amount_cents)
    }
}

pub fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

pub const MONTHLY_DUES_CENTS: u32 = 2500;
pub const NEXT_DUE_DATE: &str = "Feb 1, 2024";

pub const PAYMENTS: &[Payment] = &[
    Payment {
        id: "PAY-001",
        description: "Monthly Union Dues",
        amount_cents: 2500,
        date: "2024-01-01",
        status: PaymentStatus::Paid,
        method: "Credit Card",
    },
    Payment {
        id: "PAY-002",
        description: "Emergency Fund Contribution",
        amount_cents: 1000,
        date: "2023-12-15",
        status: PaymentStatus::Paid,
        method: "Bank Transfer",
    },
    Payment {
        id: "PAY-003",
        description: "Monthly Union Dues",
        amount_cents: 2500,
        date: "2023-12-01",
        status: PaymentStatus::Paid,
        method: "Credit Card",
    },
];

pub fn find_payment(id: &str) -> Option<&'static Payment> {
    PAYMENTS.iter().find(|p| p.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Away,
    Offline,
}

impl Presence {
    pub fn dot_class(&self) -> &'static str {
        match self {
            Presence::Online => "bg-green-500",
            Presence::Away => "bg-yellow-500",
            Presence::Offline => "bg-gray-400",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Away => "away",
            Presence::Offline => "offline",
        }
    }
}

pub struct Contact {
    pub name: &'static str,
    pub role: &'static str,
    pub department: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub location: &'static str,
    pub avatar: &'static str,
    pub presence: Presence,
}

pub const CONTACTS: &[Contact] = &[
    Contact {
        name: "Sarah Johnson",
        role: "Union President",
        department: "Administration",
        email: "sarah.johnson@tee1104.org",
        phone: "+1 (555) 123-4567",
        location: "Building A, Room 101",
        avatar: "SJ",
        presence: Presence::Online,
    },
    Contact {
        name: "Mike Rodriguez",
        role: "Safety Representative",
        department: "Safety Committee",
        email: "mike.rodriguez@tee1104.org",
        phone: "+1 (555) 234-5678",
        location: "Building B, Room 205",
        avatar: "MR",
        presence: Presence::Away,
    },
    Contact {
        name: "Emily Chen",
        role: "Benefits Coordinator",
        department: "Member Services",
        email: "emily.chen@tee1104.org",
        phone: "+1 (555) 345-6789",
        location: "Building A, Room 150",
        avatar: "EC",
        presence: Presence::Online,
    },
];

pub struct MemberGroup {
    pub name: &'static str,
    pub members: u32,
    pub description: &'static str,
    pub category: &'static str,
}

pub const MEMBER_GROUPS: &[MemberGroup] = &[
    MemberGroup {
        name: "Safety Committee",
        members: 24,
        description: "Workplace safety discussions and initiatives",
        category: "Committee",
    },
    MemberGroup {
        name: "New Member Welcome",
        members: 156,
        description: "Support and guidance for new union members",
        category: "Support",
    },
    MemberGroup {
        name: "Benefits & Healthcare",
        members: 89,
        description: "Discussions about member benefits and healthcare",
        category: "Benefits",
    },
];

pub const EMERGENCY_HOTLINE: &str = "+1 (555) 911-1104";

pub fn search_directory(query: &str) -> (Vec<&'static Contact>, Vec<&'static MemberGroup>) {
    let needle = query.trim().to_lowercase();
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    let contacts = CONTACTS
        .iter()
        .filter(|c| hit(c.name) || hit(c.role) || hit(c.department))
        .collect();
    let groups = MEMBER_GROUPS
        .iter()
        .filter(|g| hit(g.name) || hit(g.description) || hit(g.category))
        .collect();

    (contacts, groups)
}

pub struct MemberProfile {
    pub name: &'static str,
    pub member_id: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub department: &'static str,
    pub position: &'static str,
    pub join_date: &'static str,
    pub membership_status: &'static str,
    pub location: &'static str,
}

pub const PROFILE: MemberProfile = MemberProfile {
    name: "John Smith",
    member_id: "TEE-1104-5678",
    email: "john.smith@company.com",
    phone: "+1 (555) 987-6543",
    department: "Manufacturing",
    position: "Senior Technician",
    join_date: "March 15, 2019",
    membership_status: "Active",
    location: "Building C, Floor 2",
};

pub const MEMBERSHIP_STATS: &[(&str, &str)] = &[
    ("Years of Service", "5"),
    ("Tickets Raised", "12"),
    ("Dues Paid", "Current"),
    ("Member Level", "Senior"),
];

pub const UNION_STATS: &[(&str, &str)] = &[
    ("Members", "1,247"),
    ("Open Tickets", "43"),
    ("Resolution Rate", "92%"),
];

pub const ADMIN_STATS: &[(&str, &str)] = &[
    ("Active Members", "1,247"),
    ("Pending Tickets", "43"),
    ("Awaiting Approval", "12"),
];

pub struct Activity {
    pub title: &'static str,
    pub detail: &'static str,
    pub when: &'static str,
}

pub const RECENT_ACTIVITY: &[Activity] = &[
    Activity {
        title: "Ticket #1234 - Workplace Safety",
        detail: "Status: Under Review",
        when: "2 days ago",
    },
    Activity {
        title: "New Union Agreement Update",
        detail: "Important changes to benefits",
        when: "1 week ago",
    },
];

pub const PENDING_APPROVALS: &[Activity] = &[
    Activity {
        title: "Ticket #1256 - Overtime Pay Request",
        detail: "From: John Doe • Priority: High",
        when: "Pending",
    },
    Activity {
        title: "Ticket #1257 - Schedule Change",
        detail: "From: Jane Smith • Priority: Medium",
        when: "Pending",
    },
];

pub fn find_pending_approval(title: &str) -> Option<&'static Activity> {
    PENDING_APPROVALS.iter().find(|a| a.title == title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_priority_parse() {
        assert_eq!(
            TicketCategory::from_str("harassment"),
            Ok(TicketCategory::Harassment)
        );
        assert_eq!(TicketPriority::from_str("urgent"), Ok(TicketPriority::Urgent));
        assert!(TicketCategory::from_str("Safety").is_err());
        assert!(TicketPriority::from_str("").is_err());
        assert!(TicketPriority::Urgent > TicketPriority::High);
    }

    #[test]
    fn test_search_tickets() {
        assert_eq!(search_tickets("").len(), 3);
        assert_eq!(search_tickets("   ").len(), 3);

        let by_id: Vec<_> = search_tickets("1235").iter().map(|t| t.id).collect();
        assert_eq!(by_id, vec!["1235"]);

        let by_category: Vec<_> = search_tickets("BENEFITS").iter().map(|t| t.id).collect();
        assert_eq!(by_category, vec!["1236"]);

        let by_description: Vec<_> = search_tickets("factory").iter().map(|t| t.id).collect();
        assert_eq!(by_description, vec!["1234"]);

        assert!(search_tickets("payroll").is_empty());
    }

    #[test]
    fn test_search_directory() {
        let (contacts, groups) = search_directory("safety");
        assert_eq!(
            contacts.iter().map(|c| c.name).collect::<Vec<_>>(),
            vec!["Mike Rodriguez"]
        );
        assert_eq!(
            groups.iter().map(|g| g.name).collect::<Vec<_>>(),
            vec!["Safety Committee"]
        );

        let (contacts, groups) = search_directory("");
        assert_eq!((contacts.len(), groups.len()), (3, 3));
    }

    #[test]
    fn test_payments() {
        assert_eq!(format_cents(MONTHLY_DUES_CENTS), "$25.00");
        assert_eq!(find_payment("PAY-002").map(|p| p.amount()), Some("$10.00".to_string()));
        assert!(find_payment("PAY-999").is_none());
    }
}
