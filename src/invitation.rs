//! The invitation's fixed content: couple, families, venue and directions.
//!
//! Loaded once at startup (defaults, optionally overridden by the
//! `[invitation]` table of the config file) and never mutated afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which family a party belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Groom,
    Bride,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Groom => "신랑",
            Side::Bride => "신부",
        }
    }

    /// Accordion heading in the accounts section
    pub fn accounts_title(&self) -> &'static str {
        match self {
            Side::Groom => "신랑측 계좌번호",
            Side::Bride => "신부측 계좌번호",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    /// Name without the family name, used in the share title
    pub short_name: String,
    pub phone: String,
    pub father: String,
    pub mother: String,
    /// e.g. "장남" / "장녀"
    pub relation: String,
    pub bank: String,
    pub father_bank: String,
    pub mother_bank: String,
}

/// One copyable bank account line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRow<'a> {
    pub role: &'a str,
    pub bank: &'a str,
    pub holder: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Directions {
    #[serde(default)]
    pub bus: Vec<String>,
    #[serde(default)]
    pub shuttle: Vec<String>,
    #[serde(default)]
    pub shuttle_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Invitation {
    pub wedding_date: NaiveDate,
    pub date_label: String,
    pub time_label: String,
    pub venue: String,
    pub hall: String,
    pub address: String,
    pub greeting: Vec<String>,
    pub groom: Party,
    pub bride: Party,
    pub directions: Directions,
}

impl Invitation {
    pub fn party(&self, side: Side) -> &Party {
        match side {
            Side::Groom => &self.groom,
            Side::Bride => &self.bride,
        }
    }

    /// "정승환 & 방경희"
    pub fn couple_title(&self) -> String {
        format!("{} & {}", self.groom.name, self.bride.name)
    }

    /// Title used when sharing the invitation
    pub fn share_title(&self) -> String {
        format!(
            "{}♥{}의 결혼식에 초대합니다",
            self.groom.short_name, self.bride.short_name
        )
    }

    /// "정지형 · 신희영 의 장남 정승환"
    pub fn parents_line(&self, side: Side) -> String {
        let party = self.party(side);
        format!(
            "{} · {} 의 {} {}",
            party.father, party.mother, party.relation, party.name
        )
    }

    /// The three account rows of one family, in display order.
    pub fn accounts(&self, side: Side) -> [AccountRow<'_>; 3] {
        let party = self.party(side);
        [
            AccountRow {
                role: side.label(),
                bank: &party.bank,
                holder: &party.name,
            },
            AccountRow {
                role: "혼주 (부)",
                bank: &party.father_bank,
                holder: &party.father,
            },
            AccountRow {
                role: "혼주 (모)",
                bank: &party.mother_bank,
                holder: &party.mother,
            },
        ]
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Invitation {
    fn default() -> Self {
        Self {
            wedding_date: NaiveDate::from_ymd_opt(2026, 6, 6).unwrap_or_default(),
            date_label: "2026년 6월 6일 토요일".to_string(),
            time_label: "오후 1시".to_string(),
            venue: "천안 비렌티웨딩홀".to_string(),
            hall: "비렌티빌 3F 베르테홀".to_string(),
            address: "충남 천안시 서북구 천안대로 1198-30".to_string(),
            greeting: lines(&[
                "각자의 수식으로 가득했던 저희 두 사람이",
                "인생의 가장 아름다운 공통해를 찾았습니다.",
                "더하고 나누며 사랑을 키워온 저희",
                "이제 무한히 발산하는 사랑으로 함께하려 합니다.",
                "",
                "저희의 첫 공개수업에 귀한 분들을 초대합니다.",
                "부디 오셔서 따뜻한 격려와 박수를 보내주세요.",
            ]),
            groom: Party {
                name: "정승환".to_string(),
                short_name: "승환".to_string(),
                phone: "010-1234-5678".to_string(),
                father: "정지형".to_string(),
                mother: "신희영".to_string(),
                relation: "장남".to_string(),
                bank: "카카오뱅크 3333-00-0000000".to_string(),
                father_bank: "국민은행 000-000-000000".to_string(),
                mother_bank: "신한은행 000-000-000000".to_string(),
            },
            bride: Party {
                name: "방경희".to_string(),
                short_name: "경희".to_string(),
                phone: "010-9876-5432".to_string(),
                father: "방치남".to_string(),
                mother: "송은경".to_string(),
                relation: "장녀".to_string(),
                bank: "토스뱅크 1000-00-0000000".to_string(),
                father_bank: "우리은행 000-000-000000".to_string(),
                mother_bank: "하나은행 000-000-000000".to_string(),
            },
            directions: Directions {
                bus: lines(&[
                    "성환방면 100번대 버스 이용 후 천안 공주대학교에서 하차 후 도보 5분",
                    "천안역(이태리안경) - 100번, 110번",
                    "천안고속버스터미널(맥도날드앞) - 112번, 140번, 141번, 143번, 144번, 145번, 150번, 151번",
                ]),
                shuttle: lines(&[
                    "천안종합터미널 - 신세계백화점(아라리오광장) - 올리브영&스타벅스 건물 앞 횡단보도",
                    "두정역 - 1번 출구에서 나와서 오른쪽으로 50m 지점 파란색 셔틀버스 승강장",
                ]),
                shuttle_notes: lines(&[
                    "※ 예식시간 1시간 전부터 30분 간격으로 셔틀버스 이용 가능",
                    "※ 시외버스터미널 → 두정역 → 비렌티웨딩홀",
                    "※ 자세한 운영 시간은 문의 예약실 041-554-5500",
                ]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        let invitation = Invitation::default();
        assert_eq!(invitation.couple_title(), "정승환 & 방경희");
        assert_eq!(invitation.share_title(), "승환♥경희의 결혼식에 초대합니다");
        assert_eq!(
            invitation.parents_line(Side::Bride),
            "방치남 · 송은경 의 장녀 방경희"
        );
    }

    #[test]
    fn test_account_rows() {
        let invitation = Invitation::default();
        let rows = invitation.accounts(Side::Groom);
        assert_eq!(rows[0].role, "신랑");
        assert_eq!(rows[0].bank, "카카오뱅크 3333-00-0000000");
        assert_eq!(rows[1].holder, "정지형");
        assert_eq!(rows[2].bank, "신한은행 000-000-000000");
    }

    #[test]
    fn test_toml_override() {
        let mut invitation = Invitation::default();
        invitation.venue = "Grand Hall".to_string();
        let text = toml::to_string_pretty(&invitation).unwrap();
        let parsed: Invitation = toml::from_str(&text).unwrap();
        assert_eq!(parsed, invitation);
        assert_eq!(parsed.wedding_date, NaiveDate::from_ymd_opt(2026, 6, 6).unwrap());
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let parsed: Invitation = toml::from_str(
            r#"
venue = "Grand Hall"
time_label = "오후 2시"
"#,
        )
        .unwrap();
        assert_eq!(parsed.venue, "Grand Hall");
        assert_eq!(parsed.time_label, "오후 2시");
        assert_eq!(parsed.groom, Invitation::default().groom);
    }
}
