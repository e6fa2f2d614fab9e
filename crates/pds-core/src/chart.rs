use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::digits::{Reduction, digit_sum, reduce, tradition_path};
use crate::error::Result;
use crate::name::{Temperament, name_values};
use crate::triangle::{TriangleChart, TriangleParams};

/// Everything the chart views render for one person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub birth_date: Date,
    pub age: u32,
    /// Tradition path of the full birth-date digit sum.
    pub life_path: String,
    pub life_path_number: u8,
    pub soul: Reduction,
    pub persona: Reduction,
    pub destiny: Reduction,
    pub temperament: Temperament,
    pub inner: u8,
    /// Theme of the calendar year of `today`.
    pub personal_year: u8,
    pub anchor: String,
    pub maturity: u8,
    /// The M digit.
    pub restrict: u8,
    pub params: TriangleParams,
    pub triangle: TriangleChart,
}

/// Compose a full chart. `today` drives age and personal year, so the same
/// birth date and name give different charts in different calendar years.
pub fn compose_chart(birth: Date, latin_name: &str, today: Date) -> Result<Chart> {
    let age = birth.age_on(today)?;

    let all_sum: u64 = birth.digits().iter().map(|&d| u64::from(d)).sum();
    let names = name_values(latin_name);
    let triangle = TriangleChart::compute(birth);

    let life_path_number = reduce(all_sum);
    let personal_year = reduce(
        digit_sum(u64::from(today.year())) + u64::from(birth.month()) + u64::from(birth.day()),
    );
    let maturity = reduce(u64::from(life_path_number) + u64::from(names.destiny.value));
    let params = triangle.params();

    Ok(Chart {
        birth_date: birth,
        age,
        life_path: tradition_path(all_sum),
        life_path_number,
        soul: names.soul,
        persona: names.persona,
        destiny: names.destiny,
        temperament: names.temperament,
        inner: triangle.inner,
        personal_year,
        anchor: triangle.anchor.clone(),
        maturity,
        restrict: params.M,
        params,
        triangle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_life_path() {
        // 1+9+9+0+0+1+0+1 = 21 → 3
        let c = compose_chart(d("1990-01-01"), "", d("2026-10-14")).unwrap();
        assert_eq!(c.life_path, "21/3");
        assert_eq!(c.life_path_number, 3);
        assert_eq!(c.anchor, "213");
        assert_eq!(c.restrict, 2);
        assert_eq!(c.inner, 5);
    }

    #[test]
    fn test_personal_year_follows_today() {
        let birth = d("1990-01-01");
        // 2+0+2+6 + 1 + 1 = 12 → 3
        let a = compose_chart(birth, "", d("2026-10-14")).unwrap();
        assert_eq!(a.personal_year, 3);
        // 2+0+2+7 + 1 + 1 = 13 → 4
        let b = compose_chart(birth, "", d("2027-03-01")).unwrap();
        assert_eq!(b.personal_year, 4);
    }

    #[test]
    fn test_maturity_adds_destiny() {
        // life path 3, destiny of "ABC" is 6 → 9
        let c = compose_chart(d("1990-01-01"), "ABC", d("2026-10-14")).unwrap();
        assert_eq!(c.destiny.value, 6);
        assert_eq!(c.maturity, 9);
        assert_eq!(c.temperament.to_string(), "0-1-2-0");
    }

    #[test]
    fn test_empty_name_maturity_is_life_path() {
        let c = compose_chart(d("1990-01-01"), "", d("2026-10-14")).unwrap();
        assert_eq!(c.maturity, c.life_path_number);
    }

    #[test]
    fn test_age_is_birthday_aware() {
        let birth = d("1990-10-15");
        assert_eq!(compose_chart(birth, "", d("2026-10-14")).unwrap().age, 35);
        assert_eq!(compose_chart(birth, "", d("2026-10-15")).unwrap().age, 36);
    }

    #[test]
    fn test_today_before_birth_is_rejected() {
        assert!(compose_chart(d("2030-01-01"), "", d("2026-10-14")).is_err());
    }
}
