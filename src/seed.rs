use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Assignment, AssignmentStatus, Course, Faq};

#[derive(Clone, Debug, Default)]
pub struct SeedData {
    pub faqs: Vec<Faq>,
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
}

impl SeedData {
    pub fn department() -> Self {
        Self {
            faqs: department_faqs(),
            courses: department_courses(),
            assignments: department_assignments(),
        }
    }
}

fn faq(faq_id: &str, question: &str, answer: &str, category: &str, keywords: &[&str]) -> Faq {
    Faq {
        faq_id: faq_id.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
        category: category.to_string(),
        keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
        confidence_level: 1.0,
    }
}

fn department_faqs() -> Vec<Faq> {
    vec![
        faq(
            "SEE001",
            "When is the SEE exam for NLP?",
            "SEE exam for 22AML71 - Natural Language Processing is on 16.12.2025 (Tuesday) from 2:00 PM to 5:00 PM.",
            "exam",
            &["see", "nlp", "22aml71", "exam date"],
        ),
        faq(
            "SEE002",
            "When is the SEE exam for Quantum Computing?",
            "SEE exam for 22AML72 - Quantum Computing is on 18.12.2025 (Thursday) from 2:00 PM to 5:00 PM.",
            "exam",
            &["see", "quantum", "22aml72", "exam date"],
        ),
        faq(
            "SEE003",
            "When is the SEE exam for Business Intelligence?",
            "SEE exam for 22AML73 - Business Intelligence is on 22.12.2025 (Monday) from 2:00 PM to 5:00 PM.",
            "exam",
            &["see", "business intelligence", "22aml73", "exam date"],
        ),
        faq(
            "SEE004",
            "When is the SEE exam for Data Mining?",
            "SEE exam for 22AML74 - Data Mining and Data Warehousing is on 24.12.2025 (Wednesday) from 2:00 PM to 5:00 PM.",
            "exam",
            &["see", "data mining", "22aml74", "exam date"],
        ),
        faq(
            "SEE005",
            "When is the SEE exam for Addictive Manufacturing?",
            "SEE exam for 22AML75 - Addictive Manufacturing is on 29.12.2025 (Monday) from 2:00 PM to 5:00 PM.",
            "exam",
            &["see", "addictive manufacturing", "22aml75", "exam date"],
        ),
        faq(
            "SEE006",
            "When are SEE practical exams?",
            "SEE practical examinations will be held between 2nd January 2026 and 10th January 2026.",
            "exam",
            &["see", "practical", "lab exam"],
        ),
        faq(
            "SEE007",
            "What is the SEE exam timing?",
            "All SEE theory exams for VII Semester are from 2:00 PM to 5:00 PM (3 hours duration).",
            "exam",
            &["see", "timing", "duration"],
        ),
        faq(
            "TT001",
            "What is Monday's timetable?",
            "Monday: 8:30-9:30 AM 22AML71 (NLP), 9:30-10:30 AM 22AML74A (Open Elective), Break 10:30-11:00 AM, 11:00-12:00 PM 22AML72 (Quantum), 12:00-1:00 PM 22AML76 (Major Project), Lunch 1:00-2:00 PM, 2:00-3:00 PM 22AML73 (BI), 3:00-4:00 PM 22AML76 (Major Project).",
            "timetable",
            &["monday", "schedule", "timetable"],
        ),
        faq(
            "TT002",
            "What is Tuesday's timetable?",
            "Tuesday: 8:30-9:30 AM 22AML76 (Major Project), 9:30-10:30 AM 22AML72 (Quantum), Break 10:30-11:00 AM, 11:00-12:00 PM 22AML71 (NLP), 12:00-1:00 PM Skill Lab, Lunch 1:00-2:00 PM, 2:00-3:00 PM 22AML73(T) (BI Theory).",
            "timetable",
            &["tuesday", "schedule", "timetable"],
        ),
        faq(
            "TT003",
            "What is Wednesday's timetable?",
            "Wednesday: 8:30-9:30 AM 22AML73 (BI), 9:30-10:30 AM Open Elective, Break 10:30-11:00 AM, 11:00-12:00 PM 22AML71 (NLP), 12:00-1:00 PM 22AML76 (Major Project), Lunch 1:00-2:00 PM, 2:00-4:00 PM 22AML76 (Major Project - 2 hours).",
            "timetable",
            &["wednesday", "schedule", "timetable"],
        ),
        faq(
            "TT004",
            "What is Thursday's timetable?",
            "Thursday: 8:30-9:30 AM 22AML74A (Data Mining) in AIB-401, 9:30-10:30 AM 22AML71 (NLP) in AIB-402, Break 10:30-11:00 AM, 11:00-12:00 PM 22AML72 (Quantum Lab) in AIB-Lab1.",
            "timetable",
            &["thursday", "schedule", "timetable"],
        ),
        faq(
            "TT005",
            "What is Friday's timetable?",
            "Friday: 8:30-9:30 AM 22AML74A (Data Mining) in AIB-402, 9:30-10:30 AM 22AML72 (Quantum) in AIB-402, Break 10:30-11:00 AM, 11:00-12:00 PM 22AML73 (BI) in AIB-402.",
            "timetable",
            &["friday", "schedule", "timetable"],
        ),
        faq(
            "FAC001",
            "Who is the class teacher?",
            "Prof. Prasanna N is the Class Teacher for VII Semester AI & ML.",
            "faculty",
            &["class teacher", "prasanna"],
        ),
        faq(
            "FAC002",
            "Who teaches Natural Language Processing?",
            "Prof. Vasugi I (VI) teaches 22AML71 Natural Language Processing.",
            "faculty",
            &["nlp", "vasugi", "22aml71"],
        ),
        faq(
            "FAC003",
            "Who teaches Quantum Computing?",
            "Dr. Roopa BS (RBS) teaches 22AML72 Quantum Computing.",
            "faculty",
            &["quantum", "roopa", "22aml72"],
        ),
        faq(
            "FAC004",
            "Who teaches Business Intelligence?",
            "Prof. Prasanna N teaches 22AML73 Business Intelligence.",
            "faculty",
            &["business intelligence", "prasanna", "22aml73"],
        ),
        faq(
            "FAC005",
            "Who teaches Data Mining?",
            "Prof. Vani teaches 22AML74A Data Mining and Data Warehousing.",
            "faculty",
            &["data mining", "vani", "22aml74a"],
        ),
        faq(
            "FAC006",
            "Who coordinates Major Project?",
            "22AML76 Major Project Phase-II is coordinated by Prof. C Christlin Shanuja (CS) and Prof. Vasugi I (VI).",
            "faculty",
            &["major project", "christlin", "vasugi", "22aml76"],
        ),
        faq(
            "FAC007",
            "Who coordinates Skill Lab?",
            "Skill Lab is coordinated by Prof. C Christlin Shanuja (CS) and Prof. Vani.",
            "faculty",
            &["skill lab", "christlin", "vani"],
        ),
        faq(
            "CAL001",
            "When does the semester start?",
            "Odd Semester 7 commenced on 18th August 2025 (Monday).",
            "calendar",
            &["semester start", "commencement"],
        ),
        faq(
            "CAL002",
            "When is the last working day?",
            "The last working day of Odd Semester 7 is 22nd November 2025 (Friday).",
            "calendar",
            &["last day", "semester end"],
        ),
        faq(
            "CAL003",
            "When is IA1?",
            "IA1 question papers must be submitted to COE on 26th September 2025. The exam will be conducted in the following week (6-11 October 2025).",
            "exam",
            &["ia1", "internal assessment"],
        ),
        faq(
            "CAL004",
            "When is IA2?",
            "IA2 question papers must be submitted to COE on 3rd November 2025. The exam will be conducted in the following week.",
            "exam",
            &["ia2", "internal assessment"],
        ),
        faq(
            "CAL005",
            "When are Open Elective exams?",
            "Open Elective exams are scheduled on 8th October 2025 (Afternoon) and 12th November 2025 (Afternoon).",
            "exam",
            &["open elective", "exam"],
        ),
        faq(
            "CAL006",
            "When is Parent Teacher Meeting?",
            "Parent Teacher Meeting Week is scheduled during 6-11 October 2025.",
            "event",
            &["ptm", "parent teacher meeting"],
        ),
        faq(
            "CAL007",
            "When is Class Committee Meeting?",
            "Class Committee Meeting Week is scheduled during 1-6 September 2025.",
            "event",
            &["class committee", "meeting"],
        ),
        faq(
            "CAL008",
            "When is Remedial Class Week?",
            "Remedial Class Week is scheduled during 13-18 October 2025.",
            "event",
            &["remedial", "class"],
        ),
        faq(
            "HOL001",
            "What are the holidays in this semester?",
            "Holidays: 27 Aug (Varasiddhi Vinayaka Vratha), 1 Oct (Maha Navami/Vijayadashami), 2 Oct (Gandhi Jayanthi), 20 Oct (Diwali), 22 Oct (Balipadyami). Also, every 1st and 3rd Saturday of the month are holidays.",
            "holiday",
            &["holiday", "festival", "saturday"],
        ),
        faq(
            "HOL002",
            "Are Saturdays holidays?",
            "Every 1st and 3rd Saturday of the month are holidays. Working Saturdays are utilized for Personality Development, Placement Training, Aptitude Training and Non-Academic Activities.",
            "holiday",
            &["saturday", "holiday", "working day"],
        ),
        faq(
            "POL001",
            "What is the attendance requirement?",
            "85% attendance is mandatory for all courses in the semester.",
            "policy",
            &["attendance", "policy", "mandatory"],
        ),
        faq(
            "POL002",
            "When should VAC/Certification documents be submitted?",
            "Report/Document relevant to VAC/Certification courses conducted by the department should be submitted to IQAC on or before 22nd November 2025.",
            "policy",
            &["vac", "certification", "submission"],
        ),
        faq(
            "POL003",
            "When should Co-Po Mapping be completed?",
            "Co-Po Mapping have to be completed on or before 22nd December 2025.",
            "policy",
            &["co-po", "mapping", "deadline"],
        ),
        faq(
            "WD001",
            "How many working days are there?",
            "Total working days: Monday-13, Tuesday-14, Wednesday-11, Thursday-13, Friday-14, Saturday-8. Classroom interactive days: Monday-11, Tuesday-12, Wednesday-9, Thursday-13, Friday-14, Saturday-8.",
            "calendar",
            &["working days", "interactive days"],
        ),
        faq(
            "CONT001",
            "What is the college contact information?",
            "Global Academy of Technology, Ideal Homes Township, Rajarajeshwari Nagar, Bangalore-560 098. Phone: +91-080-28603158, 28603157. Email: info@gat.ac.in. Website: www.gat.ac.in",
            "contact",
            &["contact", "phone", "email", "address"],
        ),
        faq(
            "CLASS001",
            "Which classrooms are used?",
            "Classes are held in classrooms AIB-401 and AIB-402. Lab sessions are conducted in AIB-Lab1.",
            "facility",
            &["classroom", "lab", "location"],
        ),
        faq(
            "CLASS002",
            "When is the timetable effective from?",
            "The timetable for Academic Year 2025-2026 (Odd Semester) for Semester VII is effective from 18th August 2025.",
            "timetable",
            &["timetable", "effective date"],
        ),
    ]
}

fn course(
    code: &str,
    name: &str,
    course_type: &str,
    credits: i64,
    faculty_theory: &str,
    faculty_lab: Option<&str>,
    hours_per_week: &str,
) -> Course {
    Course {
        course_code: code.to_string(),
        course_name: name.to_string(),
        course_type: course_type.to_string(),
        credits,
        faculty_theory: faculty_theory.to_string(),
        faculty_lab: faculty_lab.map(str::to_string),
        semester: 7,
        cie_marks: 50,
        see_marks: 50,
        hours_per_week: hours_per_week.to_string(),
    }
}

fn department_courses() -> Vec<Course> {
    vec![
        course(
            "22AML71",
            "Natural Language Processing",
            "IPC",
            4,
            "Prof. Vasugi I",
            Some("Prof. Vasugi I"),
            "4L + 2P",
        ),
        course(
            "22AML72",
            "Quantum Computing",
            "IPC",
            4,
            "Dr. Roopa B S",
            Some("Dr. Roopa B S"),
            "4L + 2P",
        ),
        course(
            "22AML73",
            "Business Intelligence",
            "PC",
            4,
            "Prof. Prasanna N",
            Some("Prof. Prasanna N"),
            "4L + 2P",
        ),
        course(
            "22AML74A",
            "Data Mining & Data Warehousing",
            "PEC",
            3,
            "Prof. Vani",
            Some("Prof. Vani"),
            "3L + 2P",
        ),
        course(
            "22AML75",
            "Addictive Manufacturing",
            "Elective",
            3,
            "TBD",
            None,
            "3L",
        ),
        course(
            "22AML75A",
            "Business Intelligence (Open Elective)",
            "Open Elective",
            3,
            "Prof. Sushmitha M",
            None,
            "3L",
        ),
        course(
            "22AML76",
            "Major Project Phase-II",
            "Project",
            6,
            "Prof. C Christlin Shanuja, Prof. Vasugi I",
            None,
            "12 hours",
        ),
    ]
}

fn deadline(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn assignment(
    id: i64,
    course_code: &str,
    title: &str,
    assignment_type: &str,
    due: DateTime<Utc>,
    marks: i64,
    description: &str,
) -> Assignment {
    Assignment {
        id,
        course_code: course_code.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        assignment_type: assignment_type.to_string(),
        deadline: due,
        marks,
        status: AssignmentStatus::Pending,
    }
}

fn department_assignments() -> Vec<Assignment> {
    vec![
        assignment(
            1,
            "22AML71",
            "Seminar 1 - Regular Expressions and Text Processing",
            "seminar",
            deadline(2025, 11, 20),
            10,
            "Present on regular expressions, tokenization, and text preprocessing techniques.",
        ),
        assignment(
            2,
            "22AML71",
            "Term Paper - N-gram Language Models",
            "term_paper",
            deadline(2025, 11, 27),
            10,
            "Write a comprehensive term paper on N-gram language models and their applications.",
        ),
        assignment(
            3,
            "22AML71",
            "Mini Project - Sentiment Analysis System",
            "mini_project",
            deadline(2025, 12, 10),
            20,
            "Develop a sentiment analysis system using NLP techniques.",
        ),
        assignment(
            4,
            "22AML72",
            "Seminar 1 - Quantum Gates and Circuits",
            "seminar",
            deadline(2025, 11, 22),
            10,
            "Present on quantum gates, quantum circuits, and quantum algorithms.",
        ),
        assignment(
            5,
            "22AML72",
            "Lab Assignment - Quantum Circuit Implementation",
            "lab_assignment",
            deadline(2025, 12, 5),
            15,
            "Implement quantum circuits using Qiskit or similar framework.",
        ),
        assignment(
            6,
            "22AML72",
            "Mini Project - Quantum Algorithm Simulation",
            "mini_project",
            deadline(2025, 12, 12),
            20,
            "Simulate a quantum algorithm (Grover's or Shor's algorithm).",
        ),
        assignment(
            7,
            "22AML73",
            "Case Study - BI Dashboard Design",
            "case_study",
            deadline(2025, 11, 25),
            10,
            "Analyze and design a Business Intelligence dashboard for a real-world scenario.",
        ),
        assignment(
            8,
            "22AML73",
            "Mini Project - Data Visualization and Analytics",
            "mini_project",
            deadline(2025, 12, 8),
            20,
            "Create an interactive data visualization and analytics solution.",
        ),
        assignment(
            9,
            "22AML74A",
            "Seminar 1 - Association Rules and Market Basket Analysis",
            "seminar",
            deadline(2025, 11, 23),
            10,
            "Present on association rule mining and market basket analysis techniques.",
        ),
        assignment(
            10,
            "22AML74A",
            "Mini Project - Clustering and Classification Analysis",
            "mini_project",
            deadline(2025, 12, 6),
            20,
            "Implement clustering and classification algorithms on a real dataset.",
        ),
        assignment(
            11,
            "22AML76",
            "Major Project Phase-II - Mid Review",
            "project_review",
            deadline(2025, 10, 15),
            25,
            "Mid-semester review of Major Project Phase-II progress.",
        ),
        assignment(
            12,
            "22AML76",
            "Major Project Phase-II - Final Submission",
            "project_submission",
            deadline(2025, 11, 20),
            25,
            "Final submission and presentation of Major Project Phase-II.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_record_has_identifier_and_primary_text() {
        let data = SeedData::department();
        assert!(data
            .faqs
            .iter()
            .all(|f| !f.faq_id.is_empty() && !f.question.is_empty()));
        assert!(data
            .courses
            .iter()
            .all(|c| !c.course_code.is_empty() && !c.course_name.is_empty()));
        assert!(data.assignments.iter().all(|a| !a.title.is_empty()));
    }

    #[test]
    fn assignments_reference_known_courses() {
        let data = SeedData::department();
        for assignment in &data.assignments {
            assert!(
                data.courses
                    .iter()
                    .any(|c| c.course_code == assignment.course_code),
                "{}",
                assignment.course_code
            );
        }
    }
}
