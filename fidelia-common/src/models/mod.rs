// File: fidelia-common/src/models/mod.rs
pub mod benefit;
pub mod business;
pub mod member;
pub mod redemption;
pub mod stats;

pub use benefit::{
    AccessMode, Benefit, BenefitFilter, BenefitForm, BenefitState, BenefitUpdate, DiscountKind,
    OriginPath, OwnerRole, SourcedBenefit,
};
pub use business::Business;
pub use member::{Member, MemberAffiliations, MemberSnapshot};
pub use redemption::{Redemption, RedemptionStatus};
pub use stats::{BenefitStats, BusinessCount, CategoryCount, MonthlyUsage, TopBenefit};
