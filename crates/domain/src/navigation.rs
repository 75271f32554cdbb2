use serde::{Deserialize, Serialize};

use crate::EffectivePermissions;

/// Navigation areas of the administrative dashboard.
///
/// Each section declares an unlock set; holding any one of those permissions
/// makes it visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Dashboard landing page.
    Overview,
    /// Articles and pages.
    Content,
    /// Job listings.
    Jobs,
    /// Scholarship listings.
    Scholarships,
    /// Newsletter campaigns and subscribers.
    Newsletter,
    /// Offered services.
    Services,
    /// Portfolio entries.
    Portfolio,
    /// About page.
    About,
    /// Team members.
    Team,
    /// Site-wide announcements.
    Announcements,
    /// Partner organizations.
    Organizations,
    /// Traffic analytics.
    Analytics,
    /// Internal utilities.
    Tools,
    /// User and role administration.
    UserRoles,
    /// System settings.
    Settings,
}

impl Section {
    /// Returns every section in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Section] = &[
            Section::Overview,
            Section::Content,
            Section::Jobs,
            Section::Scholarships,
            Section::Newsletter,
            Section::Services,
            Section::Portfolio,
            Section::About,
            Section::Team,
            Section::Announcements,
            Section::Organizations,
            Section::Analytics,
            Section::Tools,
            Section::UserRoles,
            Section::Settings,
        ];

        ALL
    }

    /// Returns a stable transport value for this section.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Content => "content",
            Self::Jobs => "jobs",
            Self::Scholarships => "scholarships",
            Self::Newsletter => "newsletter",
            Self::Services => "services",
            Self::Portfolio => "portfolio",
            Self::About => "about",
            Self::Team => "team",
            Self::Announcements => "announcements",
            Self::Organizations => "organizations",
            Self::Analytics => "analytics",
            Self::Tools => "tools",
            Self::UserRoles => "user_roles",
            Self::Settings => "settings",
        }
    }

    /// Returns the navigation label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Content => "Content",
            Self::Jobs => "Jobs",
            Self::Scholarships => "Scholarships",
            Self::Newsletter => "Newsletter",
            Self::Services => "Services",
            Self::Portfolio => "Portfolio",
            Self::About => "About",
            Self::Team => "Team",
            Self::Announcements => "Announcements",
            Self::Organizations => "Organizations",
            Self::Analytics => "Analytics",
            Self::Tools => "Tools",
            Self::UserRoles => "User Roles",
            Self::Settings => "Settings",
        }
    }

    /// Returns the client route the section links to.
    #[must_use]
    pub fn route(&self) -> &'static str {
        match self {
            Self::Overview => "/dashboard",
            Self::Content => "/dashboard/content",
            Self::Jobs => "/dashboard/jobs",
            Self::Scholarships => "/dashboard/scholarships",
            Self::Newsletter => "/dashboard/newsletter",
            Self::Services => "/dashboard/services",
            Self::Portfolio => "/dashboard/portfolio",
            Self::About => "/dashboard/about",
            Self::Team => "/dashboard/team",
            Self::Announcements => "/dashboard/announcements",
            Self::Organizations => "/dashboard/organizations",
            Self::Analytics => "/dashboard/analytics",
            Self::Tools => "/dashboard/tools",
            Self::UserRoles => "/dashboard/user-roles",
            Self::Settings => "/dashboard/settings",
        }
    }

    /// Returns the permissions that unlock this section (logical OR).
    #[must_use]
    pub fn unlock_permissions(&self) -> &'static [&'static str] {
        match self {
            Self::Overview => &["dashboard.view"],
            Self::Content => &["content.view"],
            Self::Jobs => &["jobs.view"],
            Self::Scholarships => &["scholarships.view"],
            Self::Newsletter => &["newsletter.view"],
            Self::Services => &["services.view"],
            Self::Portfolio => &["portfolio.view"],
            Self::About => &["about.view"],
            Self::Team => &["team.view"],
            Self::Announcements => &["announcements.view"],
            Self::Organizations => &["organizations.view"],
            Self::Analytics => &["analytics.view"],
            Self::Tools => &["tools.view"],
            Self::UserRoles => &["users.view", "users.manage", "roles.view", "roles.manage"],
            Self::Settings => &["settings.view", "settings.edit"],
        }
    }

    /// Returns whether the section is visible for the permission set.
    #[must_use]
    pub fn is_visible_to(&self, permissions: &EffectivePermissions) -> bool {
        permissions.is_super_admin() || permissions.intersects(self.unlock_permissions())
    }
}

/// Returns the sections visible for a permission set, in display order.
#[must_use]
pub fn visible_sections(permissions: &EffectivePermissions) -> Vec<Section> {
    Section::all()
        .iter()
        .filter(|section| section.is_visible_to(permissions))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::{EffectivePermissions, PermissionName};

    use super::{Section, visible_sections};

    fn effective(values: &[&str]) -> EffectivePermissions {
        let names: BTreeSet<PermissionName> = values
            .iter()
            .map(|value| PermissionName::new(*value).unwrap_or_else(|error| panic!("{error}")))
            .collect();
        EffectivePermissions::compute(&names, names.clone(), &[])
    }

    const BLOGGER: &[&str] = &[
        "dashboard.view",
        "content.view",
        "content.create",
        "content.edit",
        "content.publish",
        "jobs.view",
        "jobs.create",
        "jobs.edit",
        "jobs.publish",
        "scholarships.view",
        "scholarships.create",
        "scholarships.edit",
        "scholarships.publish",
        "newsletter.view",
        "newsletter.create",
    ];

    #[test]
    fn blogger_sees_exactly_five_sections() {
        let sections = visible_sections(&effective(BLOGGER));

        assert_eq!(
            sections,
            vec![
                Section::Overview,
                Section::Content,
                Section::Jobs,
                Section::Scholarships,
                Section::Newsletter,
            ]
        );
    }

    #[test]
    fn any_unlock_permission_is_enough() {
        let sections = visible_sections(&effective(&["roles.view"]));
        assert_eq!(sections, vec![Section::UserRoles]);

        let sections = visible_sections(&effective(&["settings.edit"]));
        assert_eq!(sections, vec![Section::Settings]);
    }

    #[test]
    fn write_permission_alone_does_not_unlock_view_section() {
        let sections = visible_sections(&effective(&["jobs.create", "content.edit"]));
        assert!(sections.is_empty());
    }

    #[test]
    fn super_admin_sees_every_section_even_with_empty_catalog() {
        let sections = visible_sections(&EffectivePermissions::super_admin(&BTreeSet::new()));
        assert_eq!(sections.as_slice(), Section::all());
    }

    #[test]
    fn empty_set_sees_nothing() {
        assert!(visible_sections(&EffectivePermissions::empty()).is_empty());
    }

    #[test]
    fn transport_values_are_unique() {
        let values: BTreeSet<&str> = Section::all().iter().map(Section::as_str).collect();
        assert_eq!(values.len(), Section::all().len());
    }

    fn unlock_universe() -> Vec<&'static str> {
        Section::all()
            .iter()
            .flat_map(|section| section.unlock_permissions().iter().copied())
            .chain(["content.create", "jobs.publish", "newsletter.create"])
            .collect()
    }

    proptest! {
        #[test]
        fn section_visible_iff_unlock_set_intersects(
            held in prop::sample::subsequence(unlock_universe(), 0..8),
        ) {
            let permissions = effective(&held);
            let visible = visible_sections(&permissions);

            for section in Section::all() {
                let expected = section
                    .unlock_permissions()
                    .iter()
                    .any(|permission| held.contains(permission));
                prop_assert_eq!(visible.contains(section), expected);
            }
        }
    }
}
