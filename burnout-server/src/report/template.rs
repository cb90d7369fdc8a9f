//! Deterministic report built from fixed text

use std::fmt::Write;

use burnout_core::Level;

use super::{ReportGenerator, ReportInput, SECTIONS, TOPICS};

/// Report generator that needs no external service
pub struct TemplateReportGenerator;

impl TemplateReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TemplateReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn level_meaning(level: Level) -> &'static str {
    match level {
        Level::Low => {
            "A low score means the demands of your work are, for now, mostly balanced \
             by the energy you get back from rest and the rest of your life. Stress shows \
             up occasionally but does not settle in."
        }
        Level::Moderate => {
            "A moderate score means stress has started to outpace recovery. You may still \
             function well on most days, but fatigue, preoccupation with work and a \
             shrinking sense of satisfaction are becoming familiar."
        }
        Level::High => {
            "A high score means exhaustion has become the norm rather than the exception. \
             Rest no longer restores you fully, work follows you home, and motivation is \
             hard to find. This is a signal to act, not a verdict on you."
        }
    }
}

fn recovery_focus(level: Level) -> &'static str {
    match level {
        Level::Low => {
            "Your focus is protection: keep the habits that are working and notice early \
             when they start to slip."
        }
        Level::Moderate => {
            "Your focus is rebalancing: reclaim recovery time and reduce the few sources \
             of stress that cost you the most."
        }
        Level::High => {
            "Your focus is relief first: lower the load where you can, restore sleep and \
             rest, and ask for support before adding anything new."
        }
    }
}

impl ReportGenerator for TemplateReportGenerator {
    fn generate(&self, input: &ReportInput) -> Result<String, String> {
        let mut out = String::new();
        let name = &input.first_name;
        let drivers = input.drivers();

        // Writing to a String cannot fail
        let _ = writeln!(out, "# Your Personalized Burnout Recovery Report\n");

        let _ = writeln!(out, "## 1. {}\n", SECTIONS[0]);
        let _ = writeln!(
            out,
            "{}, thank you for taking the time to look honestly at how work is affecting \
             you. Your burnout score is **{}/100**, which places you in the **{}** range.\n\n\
             This report walks through what that means, what seems to be driving it, and \
             a practical plan for the next two weeks.\n",
            name, input.score, input.level
        );

        let _ = writeln!(out, "## 2. {}\n", SECTIONS[1]);
        let _ = writeln!(out, "{}\n", level_meaning(input.level));

        let _ = writeln!(out, "## 3. {}\n", SECTIONS[2]);
        if drivers.is_empty() {
            let _ = writeln!(
                out,
                "None of your answers stood out as a strong burnout signal. Your responses:\n"
            );
        } else {
            let _ = writeln!(out, "These answers point to where the pressure comes from:\n");
        }
        let listed: Vec<(&str, &str)> = if drivers.is_empty() {
            TOPICS
                .iter()
                .map(|(id, topic)| (*topic, input.answer(*id)))
                .collect()
        } else {
            drivers
        };
        for (topic, label) in &listed {
            let _ = writeln!(out, "- **{}**: {}", topic, label);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## 4. {}\n", SECTIONS[3]);
        let _ = writeln!(out, "{}\n", recovery_focus(input.level));

        let _ = writeln!(out, "## 5. {}\n", SECTIONS[4]);
        let _ = writeln!(
            out,
            "**Week 1: Create space**\n\
             - Set a fixed end to your workday and keep it on at least four days\n\
             - Take one short break away from screens every afternoon\n\
             - Write down the three tasks that drain you most\n\n\
             **Week 2: Build momentum**\n\
             - Remove, delegate or renegotiate one of those draining tasks\n\
             - Protect one evening this week for something that restores you\n\
             - Review what changed and keep the two actions that helped most\n"
        );

        let _ = writeln!(out, "## 6. {}\n", SECTIONS[5]);
        let _ = writeln!(
            out,
            "- **Digital**: turn off work notifications outside working hours\n\
             - **Time**: decide in advance when work stops each day\n\
             - **Mental**: close the day by writing tomorrow's first task, then let it go\n\
             - **Physical**: keep work out of the spaces where you rest\n\
             - **Communication**: practice saying no to one non-essential request a week\n"
        );

        let _ = writeln!(out, "## 7. {}\n", SECTIONS[6]);
        let _ = writeln!(
            out,
            "- A five-minute daily check on energy and mood\n\
             - A weekly review of workload against your boundaries\n\
             - A monthly look back at what restored you and what drained you\n\
             - Watch for returning warning signs such as poor sleep or dread on Sunday evenings\n\
             - Keep one person you trust informed about how you are doing\n"
        );

        let _ = writeln!(out, "## 8. {}\n", SECTIONS[7]);
        let _ = writeln!(
            out,
            "{}, recovery is achievable, and taking this assessment was a real first step. \
             Small, steady changes add up. Be patient with yourself as you put them in place.",
            name
        );

        Ok(out)
    }
}
