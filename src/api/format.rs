//! Response views. Stored models carry BSON-specific serde attributes, so every
//! result leaves through one of these: ids as hex strings, dates as RFC 3339.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{
    Admin, Article, Contact, DateRange, KnowledgeBase, KnowledgeProgram, ProgramDetails,
    SocialMedia, Student, StudyProgram, TrackLobby, TrackRecord, University,
};
use crate::services::{Session, StudyProgramWithUniversity};

/// Returned by admin registration. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminView {
    #[serde(rename = "ID")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl From<&Admin> for AdminView {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.to_hex(),
            username: admin.username.clone(),
            email: admin.email.clone(),
            full_name: admin.full_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminSummary {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

/// Login and profile result: `{admin, token}`.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub admin: AdminSummary,
    pub token: String,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            admin: AdminSummary {
                username: session.admin.username,
                email: session.admin.email,
                full_name: session.admin.full_name,
            },
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackRecordView {
    pub service_name: String,
    pub service_date: String,
    pub service_cost: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrackRecord> for TrackRecordView {
    fn from(record: TrackRecord) -> Self {
        Self {
            service_name: record.service_name,
            service_date: record.service_date,
            service_cost: record.service_cost,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackLobbyView {
    pub progress: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrackLobby> for TrackLobbyView {
    fn from(lobby: TrackLobby) -> Self {
        Self {
            progress: lobby.progress,
            created_at: lobby.created_at,
            updated_at: lobby.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    pub interest: String,
    pub gender: String,
    pub phone: String,
    pub financial_ability: String,
    pub progress: String,
    pub detailsiswa_link: String,
    pub image: String,
    pub category: String,
    pub birthdate: String,
    pub track_records: Vec<TrackRecordView>,
    pub track_lobby: Vec<TrackLobbyView>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentView {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.to_hex(),
            name: student.name,
            email: student.email,
            school: student.school,
            school_id: student.school_id.map(|id| id.to_hex()),
            interest: student.interest,
            gender: student.gender,
            phone: student.phone,
            financial_ability: student.financial_ability,
            progress: student.progress,
            detailsiswa_link: student.detailsiswa_link,
            image: student.image,
            category: student.category,
            birthdate: student.birthdate,
            track_records: student.track_records.into_iter().map(Into::into).collect(),
            track_lobby: student.track_lobby.into_iter().map(Into::into).collect(),
            is_active: student.is_active,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UniversityView {
    pub id: String,
    pub name: String,
    pub alias: String,
    pub address: String,
    pub website: String,
    pub logo: String,
    pub image: String,
    pub contact: Contact,
    pub social_media: Vec<SocialMedia>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<University> for UniversityView {
    fn from(university: University) -> Self {
        Self {
            id: university.id.to_hex(),
            name: university.name,
            alias: university.alias,
            address: university.address,
            website: university.website,
            logo: university.logo,
            image: university.image,
            contact: university.contact,
            social_media: university.social_media,
            created_at: university.created_at,
            updated_at: university.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DateRangeView {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<DateRange> for DateRangeView {
    fn from(range: DateRange) -> Self {
        Self { start: range.start, end: range.end }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramDetailsView {
    pub university: Option<String>,
    pub program: String,
    pub program_type: String,
    pub ukt: String,
    pub spi: String,
    pub capacity: String,
    pub is_packet_c: bool,
    pub description: String,
    pub advantages: String,
    pub disadvantages: String,
    pub articles: Vec<Article>,
    pub requirements: Vec<String>,
    pub registration: DateRangeView,
    pub exam: DateRangeView,
    pub announcement: DateTime<Utc>,
}

impl From<ProgramDetails> for ProgramDetailsView {
    fn from(details: ProgramDetails) -> Self {
        Self {
            university: details.university.map(|id| id.to_hex()),
            program: details.program,
            program_type: details.program_type,
            ukt: details.ukt,
            spi: details.spi,
            capacity: details.capacity,
            is_packet_c: details.is_packet_c,
            description: details.description,
            advantages: details.advantages,
            disadvantages: details.disadvantages,
            articles: details.articles,
            requirements: details.requirements,
            registration: details.registration.into(),
            exam: details.exam.into(),
            announcement: details.announcement,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudyProgramView {
    pub id: String,
    pub name: String,
    pub program_details: ProgramDetailsView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudyProgram> for StudyProgramView {
    fn from(program: StudyProgram) -> Self {
        Self {
            id: program.id.to_hex(),
            name: program.name,
            program_details: program.program_details.into(),
            created_at: program.created_at,
            updated_at: program.updated_at,
        }
    }
}

/// `university` is null when the referenced university no longer exists.
#[derive(Debug, Serialize)]
pub struct StudyProgramWithUniversityView {
    pub study_program: StudyProgramView,
    pub university: Option<UniversityView>,
}

impl From<StudyProgramWithUniversity> for StudyProgramWithUniversityView {
    fn from(joined: StudyProgramWithUniversity) -> Self {
        Self {
            study_program: joined.study_program.into(),
            university: joined.university.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KnowledgeProgramView {
    pub name: String,
    pub display_name: String,
    pub study_programs: Vec<String>,
}

impl From<KnowledgeProgram> for KnowledgeProgramView {
    fn from(program: KnowledgeProgram) -> Self {
        Self {
            name: program.name,
            display_name: program.display_name,
            study_programs: program.study_programs.iter().map(|id| id.to_hex()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KnowledgeBaseView {
    pub id: String,
    pub year: String,
    pub programs: Vec<KnowledgeProgramView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<KnowledgeBase> for KnowledgeBaseView {
    fn from(kb: KnowledgeBase) -> Self {
        Self {
            id: kb.id.to_hex(),
            year: kb.year,
            programs: kb.programs.into_iter().map(Into::into).collect(),
            created_at: kb.created_at,
            updated_at: kb.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdView {
    pub id: String,
}

impl IdView {
    pub fn new(id: &bson::oid::ObjectId) -> Self {
        Self { id: id.to_hex() }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressView {
    #[serde(rename = "Progress")]
    pub progress: String,
}

/// Convert a list of models into their views.
pub fn views<M, V: From<M>>(items: Vec<M>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn admin_view_omits_password() {
        let admin = Admin {
            id: ObjectId::new(),
            username: "root".into(),
            password: "$2b$04$hash".into(),
            email: "root@example.com".into(),
            full_name: "Root".into(),
        };
        let value = serde_json::to_value(AdminView::from(&admin)).unwrap();
        assert_eq!(value["ID"], admin.id.to_hex());
        assert_eq!(value["FullName"], "Root");
        assert!(value.get("Password").is_none());
    }

    #[test]
    fn ids_and_dates_are_strings() {
        let program = StudyProgram::new("Informatika", ProgramDetails::default(), Utc::now());
        let value = serde_json::to_value(StudyProgramView::from(program.clone())).unwrap();
        assert_eq!(value["id"], program.id.to_hex());
        assert!(value["created_at"].as_str().unwrap().contains('T'));
        assert!(value["program_details"]["university"].is_null());
    }
}
