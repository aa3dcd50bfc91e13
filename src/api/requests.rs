//! JSON request bodies, one per operation. Key spelling follows what the
//! admin dashboard sends.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};

use crate::database::models::{
    Article, Contact, DateRange, KnowledgeBasePatch, KnowledgeProgram, NewTrackRecord,
    ProgramDetails, SocialMedia, StudentPatch, StudyProgramPatch, UniversityPatch,
};
use crate::filter::{Page, StudentFilter, StudyProgramFilter};
use crate::services::{parse_id, NewAdmin, ServiceResult};

/// Blank strings mean "not provided".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Page numbers arrive as JSON numbers or as numeric strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid page number: {}", s))),
    }
}

// ---------------------------------------------------------------------------
// Admin

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(default, alias = "fullName", alias = "FullName", alias = "fullname")]
    pub full_name: String,
}

impl From<CreateAdminRequest> for NewAdmin {
    fn from(req: CreateAdminRequest) -> Self {
        NewAdmin {
            username: req.username,
            password: req.password,
            email: req.email,
            full_name: req.full_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Shared

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

impl IdRequest {
    pub fn object_id(&self) -> ServiceResult<ObjectId> {
        parse_id(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Students

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub school: Option<String>,
    pub interest: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub financial_ability: Option<String>,
    pub progress: Option<String>,
    pub detailsiswa_link: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub birthdate: Option<String>,
    pub is_active: Option<bool>,
}

impl From<StudentInput> for StudentPatch {
    fn from(input: StudentInput) -> Self {
        StudentPatch {
            name: non_empty(input.name),
            email: non_empty(input.email),
            school: non_empty(input.school),
            school_id: None,
            interest: non_empty(input.interest),
            gender: non_empty(input.gender),
            phone: non_empty(input.phone),
            financial_ability: non_empty(input.financial_ability),
            progress: non_empty(input.progress),
            detailsiswa_link: non_empty(input.detailsiswa_link),
            image: non_empty(input.image),
            category: non_empty(input.category),
            birthdate: non_empty(input.birthdate),
            is_active: input.is_active,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub id: String,
    #[serde(default)]
    pub student: StudentInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentListRequest {
    #[serde(flatten)]
    pub filter: StudentFilter,
    #[serde(default, deserialize_with = "number_or_string")]
    pub page: Option<i64>,
    #[serde(default, rename = "pageSize", deserialize_with = "number_or_string")]
    pub page_size: Option<i64>,
}

impl StudentListRequest {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.page_size)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddServiceRequest {
    pub id: String,
    pub service: NewTrackRecord,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub id: String,
    #[serde(rename = "oldName", alias = "old_name")]
    pub old_name: String,
    pub service: NewTrackRecord,
}

#[derive(Debug, Deserialize)]
pub struct DeleteServiceRequest {
    pub id: String,
    pub service_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLobbyRequest {
    pub id: String,
    pub lobby: LobbyInput,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LobbyInput {
    pub progress: String,
}

// ---------------------------------------------------------------------------
// Universities

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UniversityInput {
    pub name: Option<String>,
    pub alias: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub image: Option<String>,
    pub contact: Option<Contact>,
    pub social_media: Option<Vec<SocialMedia>>,
}

impl From<UniversityInput> for UniversityPatch {
    fn from(input: UniversityInput) -> Self {
        UniversityPatch {
            name: non_empty(input.name),
            alias: non_empty(input.alias),
            address: non_empty(input.address),
            website: non_empty(input.website),
            logo: non_empty(input.logo),
            image: non_empty(input.image),
            contact: input.contact,
            social_media: input.social_media,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUniversityRequest {
    pub id: String,
    #[serde(default)]
    pub university: UniversityInput,
}

#[derive(Debug, Deserialize)]
pub struct UniversityNameRequest {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Study programs

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudyProgramInput {
    pub name: Option<String>,
    pub program_details: Option<ProgramDetailsInput>,
}

impl StudyProgramInput {
    pub fn into_patch(self) -> ServiceResult<StudyProgramPatch> {
        Ok(StudyProgramPatch {
            name: non_empty(self.name),
            program_details: self.program_details.map(ProgramDetailsInput::into_details).transpose()?,
            updated_at: None,
        })
    }
}

/// Dates are RFC 3339 strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgramDetailsInput {
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
    pub registration: DateRangeInput,
    pub exam: DateRangeInput,
    pub announcement: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DateRangeInput {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl From<DateRangeInput> for DateRange {
    fn from(input: DateRangeInput) -> Self {
        DateRange {
            start: input.start.unwrap_or_default(),
            end: input.end.unwrap_or_default(),
        }
    }
}

impl ProgramDetailsInput {
    pub fn into_details(self) -> ServiceResult<ProgramDetails> {
        let university = non_empty(self.university).map(|id| parse_id(&id)).transpose()?;
        Ok(ProgramDetails {
            university,
            program: self.program,
            program_type: self.program_type,
            ukt: self.ukt,
            spi: self.spi,
            capacity: self.capacity,
            is_packet_c: self.is_packet_c,
            description: self.description,
            advantages: self.advantages,
            disadvantages: self.disadvantages,
            articles: self.articles,
            requirements: self.requirements,
            registration: self.registration.into(),
            exam: self.exam.into(),
            announcement: self.announcement.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateStudyProgramRequest {
    #[serde(rename = "kbYear")]
    pub kb_year: String,
    #[serde(rename = "kpName")]
    pub kp_name: String,
    #[serde(default)]
    pub study_program: StudyProgramInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudyProgramRequest {
    pub id: String,
    #[serde(default)]
    pub study_program: StudyProgramInput,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudyProgramListRequest {
    #[serde(rename = "kbYear")]
    pub kb_year: String,
    #[serde(rename = "kpName")]
    pub kp_name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub page: Option<i64>,
    #[serde(rename = "pageSize", deserialize_with = "number_or_string")]
    pub page_size: Option<i64>,
    #[serde(rename = "searchQuery")]
    pub search_query: Option<String>,
    #[serde(rename = "programType")]
    pub program_type: Option<String>,
    pub program: Option<String>,
}

impl StudyProgramListRequest {
    pub fn into_parts(self) -> (StudyProgramFilter, Page) {
        let page = Page::new(self.page, self.page_size);
        let filter = StudyProgramFilter {
            kb_year: self.kb_year,
            kp_name: self.kp_name,
            search_query: self.search_query,
            program_type: self.program_type,
            program: self.program,
        };
        (filter, page)
    }
}

// ---------------------------------------------------------------------------
// Knowledge bases

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeProgramInput {
    pub name: String,
    pub display_name: String,
    pub study_programs: Vec<String>,
}

impl KnowledgeProgramInput {
    pub fn into_program(self) -> ServiceResult<KnowledgeProgram> {
        let study_programs = self
            .study_programs
            .iter()
            .map(|id| parse_id(id))
            .collect::<ServiceResult<Vec<_>>>()?;
        Ok(KnowledgeProgram {
            name: self.name,
            display_name: self.display_name,
            study_programs,
        })
    }
}

fn into_programs(inputs: Vec<KnowledgeProgramInput>) -> ServiceResult<Vec<KnowledgeProgram>> {
    inputs.into_iter().map(KnowledgeProgramInput::into_program).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseInput {
    pub year: Option<String>,
    pub programs: Option<Vec<KnowledgeProgramInput>>,
}

impl KnowledgeBaseInput {
    /// Year and programs for a new knowledge base.
    pub fn into_new(self) -> ServiceResult<(String, Vec<KnowledgeProgram>)> {
        let programs = into_programs(self.programs.unwrap_or_default())?;
        Ok((self.year.unwrap_or_default(), programs))
    }

    pub fn into_patch(self) -> ServiceResult<KnowledgeBasePatch> {
        Ok(KnowledgeBasePatch {
            year: non_empty(self.year),
            programs: self.programs.map(into_programs).transpose()?,
            updated_at: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateKnowledgeBaseRequest {
    pub id: String,
    #[serde(rename = "knowledgeBase", default)]
    pub knowledge_base: KnowledgeBaseInput,
}

#[derive(Debug, Deserialize)]
pub struct AddKnowledgeProgramRequest {
    pub id: String,
    #[serde(rename = "KnowledgeProgram", alias = "knowledgeProgram")]
    pub knowledge_program: KnowledgeProgramInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateKnowledgeProgramRequest {
    pub id: String,
    #[serde(rename = "oldName")]
    pub old_name: String,
    #[serde(rename = "KnowledgeProgram", alias = "knowledgeProgram")]
    pub knowledge_program: KnowledgeProgramInput,
}

#[derive(Debug, Deserialize)]
pub struct RemoveKnowledgeProgramRequest {
    pub id: String,
    pub program_name: String,
}
