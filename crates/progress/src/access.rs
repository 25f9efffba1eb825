//! Who may see which indicator.

use kpiboard_core::{Indicator, Role, User, Visibility};

/// A user may view an indicator when they are master, when it is visible to
/// all sectors, when it belongs to one of their sectors, or when it was
/// granted to them individually.
pub fn can_view(user: &User, indicator: &Indicator) -> bool {
    user.role == Role::Master
        || indicator.visibility == Visibility::AllSectors
        || user.sectors.contains(&indicator.sector_id)
        || user.granted.contains(&indicator.id)
}

/// `can_view`, with no viewer meaning unrestricted.
pub fn visible_to(viewer: Option<&User>, indicator: &Indicator) -> bool {
    viewer.map_or(true, |user| can_view(user, indicator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpiboard_core::{ComparisonMode, SectorId};

    fn restricted(sector: SectorId) -> Indicator {
        Indicator::new("Margin", sector, 0.3, ComparisonMode::Increasing)
            .with_visibility(Visibility::SectorRestricted)
    }

    #[test]
    fn test_master_sees_everything() {
        let master = User::new("Root", "root@example.com", Role::Master);
        assert!(can_view(&master, &restricted(SectorId::new())));
    }

    #[test]
    fn test_manager_rules() {
        let own = SectorId::new();
        let manager = User::new("Bia", "bia@example.com", Role::Manager).with_sector(own);

        assert!(can_view(&manager, &restricted(own)));
        assert!(!can_view(&manager, &restricted(SectorId::new())));

        let public = Indicator::new("Sales", SectorId::new(), 1.0, ComparisonMode::Increasing);
        assert!(can_view(&manager, &public));

        let mut granted = manager.clone();
        let foreign = restricted(SectorId::new());
        granted.granted.push(foreign.id);
        assert!(can_view(&granted, &foreign));
    }

    #[test]
    fn test_no_viewer_is_unrestricted() {
        assert!(visible_to(None, &restricted(SectorId::new())));
    }
}
